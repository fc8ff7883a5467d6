use crate::{
    add_native_word,
    runtime::{error, interpreter::Interpreter},
};
use std::{
    env::current_dir,
    fs::{canonicalize, create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};
use tracing::debug;

const LIBRARY_EXTENSION: &str = ".fth";

/// Find the first file with the given name in the search paths.
fn find_library(search_paths: &[PathBuf], name: &str) -> Option<PathBuf> {
    search_paths
        .iter()
        .map(|directory| directory.join(name))
        .find(|candidate| candidate.is_file())
}

/// Load and run a library file, searching the working directory, then the user's library
/// directory and finally the bundled libraries.  A library is only ever loaded once.
///
/// Signature: `"file" -- `
fn word_include(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, "INCLUDE")?;

    let name = interpreter.pop_as_string()?;
    let search_paths: Vec<PathBuf> = interpreter
        .config()
        .search_paths()
        .into_iter()
        .filter(|directory| directory.is_dir())
        .collect();

    let Some(found) = find_library(&search_paths, &name) else {
        let mut message = format!("Error: Library file '{}' not found in search paths:\n", name);

        for directory in &search_paths {
            message.push_str(&format!("  - {}\n", directory.display()));
        }

        interpreter.output(&message);
        return Ok(());
    };

    let path = canonicalize(&found)?;

    if interpreter.loaded_libraries().contains(&path) {
        interpreter.output(&format!("Library '{}' already loaded.\n", name));
        return Ok(());
    }

    let source = read_to_string(&path)?;

    debug!(path = %path.display(), "queueing library");

    interpreter.output(&format!("Loading library: {}\n", name));
    let _ = interpreter.loaded_libraries_mut().insert(path.clone());
    interpreter.queue_source(name, path, source);

    Ok(())
}

/// Write every colon definition to a library file in the user's library directory.
///
/// Signature: `"file" -- `
fn word_save_library(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require(1, "SAVE-LIBRARY")?;

    let mut name = interpreter.pop_as_string()?;

    if !name.ends_with(LIBRARY_EXTENSION) {
        name.push_str(LIBRARY_EXTENSION);
    }

    let directory = interpreter.config().user_library_path.clone();
    create_dir_all(&directory)?;

    let path = directory.join(&name);

    let definitions: Vec<String> = interpreter
        .dictionary()
        .compiled_words()
        .iter()
        .filter_map(|word| interpreter.dictionary().decompile(&word.name))
        .collect();

    if definitions.is_empty() {
        interpreter.output("No user-defined words to save.\n");
        return Ok(());
    }

    let mut lines = vec![
        format!("\\ Library: {}", name),
        "\\ Auto-generated by FABLE".to_string(),
        format!("\\ Contains {} word(s)", definitions.len()),
        String::new(),
    ];

    for definition in &definitions {
        lines.push(definition.clone());
        lines.push(String::new());
    }

    write(&path, lines.join("\n"))?;

    debug!(path = %path.display(), words = definitions.len(), "saved library");

    interpreter.output(&format!(
        "Saved {} word(s) to: {}\n",
        definitions.len(),
        path.display()
    ));

    Ok(())
}

/// Signature: ` -- `
fn word_loaded_libraries(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if interpreter.loaded_libraries().is_empty() {
        interpreter.output("No libraries loaded.\n");
        return Ok(());
    }

    let mut text = "Loaded libraries:\n".to_string();

    for path in interpreter.loaded_libraries() {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        text.push_str(&format!("  {}\n", name));
    }

    interpreter.output(&text);

    Ok(())
}

fn directory_line(number: usize, directory: &Path, missing: &str) -> String {
    let status = if directory.exists() { "✓" } else { missing };

    format!("  {}. {} {}\n", number, directory.display(), status)
}

/// Signature: ` -- `
fn word_library_path(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let working_directory = current_dir()?;
    let config = interpreter.config();

    let text = format!(
        "Library search paths:\n  1. {}\n{}{}",
        working_directory.display(),
        directory_line(2, &config.user_library_path, "(not created yet)"),
        directory_line(3, &config.library_path, "(not found)")
    );

    interpreter.output(&text);

    Ok(())
}

pub fn register_library_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        "INCLUDE",
        word_include,
        "Load library file.",
        "( \"filename\" -- )"
    );

    add_native_word!(
        interpreter,
        "SAVE-LIBRARY",
        word_save_library,
        "Save user words to library.",
        "( \"filename\" -- )"
    );

    add_native_word!(
        interpreter,
        "LOADED-LIBRARIES",
        word_loaded_libraries,
        "List loaded libraries.",
        "( -- )"
    );

    add_native_word!(
        interpreter,
        "LIBRARY-PATH",
        word_library_path,
        "Show library search paths.",
        "( -- )"
    );
}
