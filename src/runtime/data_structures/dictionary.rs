use crate::{
    lang::code::{ByteCode, decompile_code},
    runtime::interpreter::WordHandler,
};
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// Names closer than this to an unknown word are offered as suggestions.
const SIMILARITY_CUTOFF: f64 = 0.6;

/// The runtime of a word in the dictionary.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WordRuntime {
    /// The word is executed as soon as it's seen, even inside a colon definition.
    Immediate,

    /// Inside a colon definition the word is compiled into the definition.
    Normal,
}

/// What runs when the word is executed.
#[derive(Clone)]
pub enum WordBody {
    /// A native word written in Rust.
    Native(Rc<WordHandler>),

    /// A colon definition's threaded code.
    Compiled(Rc<ByteCode>),
}

/// The information stored in the dictionary for each word.
#[derive(Clone)]
pub struct WordInfo {
    /// The canonical, upper case, name of the word.
    pub name: String,

    pub body: WordBody,

    /// When should the word be executed?
    pub runtime: WordRuntime,

    /// A simple description of the word.
    pub description: String,

    /// The stack signature of the word, for example `( a b -- b a )`.
    pub signature: String,
}

impl WordInfo {
    pub fn is_immediate(&self) -> bool {
        self.runtime == WordRuntime::Immediate
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, WordBody::Native(_))
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.body, WordBody::Compiled(_))
    }
}

/// The dictionary used by the interpreter.  Words are looked up by name in constant time while the
/// order they were first defined in is kept for `WORDS` and `FORGET`.
#[derive(Default)]
pub struct Dictionary {
    entries: HashMap<String, Rc<WordInfo>>,
    order: Vec<String>,
}

/// Print the words in definition order, one per line, with their signature and description.
impl Display for Dictionary {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let max_size = self.order.iter().map(|name| name.len()).max().unwrap_or(0);

        writeln!(formatter, "{} words defined.\n", self.order.len())?;

        for word in self.order.iter().filter_map(|name| self.entries.get(name)) {
            let immediate = if word.is_immediate() { "  immediate" } else { "           " };

            writeln!(
                formatter,
                "{:width$}{}  {}  --  {}",
                word.name,
                immediate,
                word.signature,
                word.description,
                width = max_size
            )?;
        }

        Ok(())
    }
}

impl Dictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Dictionary {
        Dictionary::default()
    }

    /// Add a word to the dictionary, replacing any word of the same name.  A replaced word keeps
    /// its original place in the definition order.
    pub fn define(&mut self, mut info: WordInfo) {
        let name = info.name.to_uppercase();

        info.name = name.clone();

        if !self.entries.contains_key(&name) {
            self.order.push(name.clone());
        }

        let _ = self.entries.insert(name, Rc::new(info));
    }

    /// Case insensitive lookup of a word.
    pub fn lookup(&self, name: &str) -> Option<Rc<WordInfo>> {
        self.entries.get(&name.to_uppercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_uppercase())
    }

    /// Remove the word and every word defined after it.  Returns false if the word isn't known.
    pub fn forget(&mut self, name: &str) -> bool {
        let name = name.to_uppercase();

        let Some(position) = self.order.iter().position(|existing| *existing == name) else {
            return false;
        };

        for removed in self.order.drain(position..) {
            let _ = self.entries.remove(&removed);
        }

        true
    }

    /// The names of all words in definition order.  The filter, if given, is a case insensitive
    /// substring match.
    pub fn words(&self, filter: Option<&str>) -> Vec<String> {
        match filter.map(|pattern| pattern.to_uppercase()) {
            Some(pattern) if !pattern.is_empty() => self
                .order
                .iter()
                .filter(|name| name.contains(&pattern))
                .cloned()
                .collect(),
            _ => self.order.clone(),
        }
    }

    /// Find up to `limit` known names that look like the given one, closest first.
    pub fn find_similar(&self, name: &str, limit: usize) -> Vec<String> {
        let target = name.to_uppercase();

        let mut scored: Vec<(f64, &String)> = self
            .order
            .iter()
            .map(|candidate| (similarity(&target, candidate), candidate))
            .filter(|(score, _)| *score >= SIMILARITY_CUTOFF)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate.clone())
            .collect()
    }

    /// Render a word as Forth source.  Native words give a one line stub with their stack effect.
    pub fn decompile(&self, name: &str) -> Option<String> {
        let word = self.lookup(name)?;

        let text = match &word.body {
            WordBody::Native(_) => format!(": {} ( primitive ) ; {}", word.name, word.signature),
            WordBody::Compiled(code) => {
                let header = if word.signature.is_empty() {
                    format!(": {}", word.name)
                } else {
                    format!(": {} {}", word.name, word.signature)
                };

                let body = decompile_code(code);

                if body.is_empty() {
                    format!("{}\n  ;", header)
                } else {
                    format!("{}\n  {} ;", header, body)
                }
            }
        };

        Some(text)
    }

    /// All colon definitions in definition order.
    pub fn compiled_words(&self) -> Vec<Rc<WordInfo>> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .filter(|word| word.is_compiled())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Edit distance similarity between two names, 1.0 for identical names down to 0.0.
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());

    if longest == 0 {
        return 1.0;
    }

    1.0 - (levenshtein(&a, &b) as f64 / longest as f64)
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        current[0] = i + 1;

        for (j, b_char) in b.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };

            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }

        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::code::Op;

    fn compiled(name: &str) -> WordInfo {
        WordInfo {
            name: name.to_string(),
            body: WordBody::Compiled(Rc::new(vec![Op::Execute("DUP".to_string())])),
            runtime: WordRuntime::Normal,
            description: String::new(),
            signature: String::new(),
        }
    }

    fn dictionary(names: &[&str]) -> Dictionary {
        let mut dictionary = Dictionary::new();

        for name in names {
            dictionary.define(compiled(name));
        }

        dictionary
    }

    #[test]
    fn names_are_case_insensitive() {
        let dictionary = dictionary(&["square"]);

        assert!(dictionary.contains("SQUARE"));
        assert_eq!(dictionary.lookup("Square").map(|word| word.name.clone()), Some("SQUARE".into()));
    }

    #[test]
    fn redefinition_keeps_order() {
        let mut dictionary = dictionary(&["A", "B"]);

        dictionary.define(compiled("a"));

        assert_eq!(dictionary.words(None), vec!["A", "B"]);
    }

    #[test]
    fn forget_truncates() {
        let mut dictionary = dictionary(&["KEEP", "GONE", "AFTER1", "AFTER2"]);

        assert!(dictionary.forget("gone"));
        assert!(!dictionary.forget("gone"));
        assert_eq!(dictionary.words(None), vec!["KEEP"]);
    }

    #[test]
    fn words_filter() {
        let dictionary = dictionary(&["2DUP", "DUP", "DROP"]);

        assert_eq!(dictionary.words(Some("dup")), vec!["2DUP", "DUP"]);
    }

    #[test]
    fn similar_names_closest_first() {
        let dictionary = dictionary(&["DROP", "2DUP", "DUP", "SWAP"]);

        let found = dictionary.find_similar("dupp", 3);

        assert_eq!(found.first().map(String::as_str), Some("DUP"));
        assert!(!found.contains(&"SWAP".to_string()));
        assert!(dictionary.find_similar("dupp", 1).len() <= 1);
    }

    #[test]
    fn decompile_compiled_word() {
        let mut dictionary = Dictionary::new();
        let mut word = compiled("twice");

        word.signature = "( n -- n n )".to_string();
        dictionary.define(word);

        assert_eq!(dictionary.decompile("TWICE").as_deref(), Some(": TWICE ( n -- n n )\n  DUP ;"));
        assert_eq!(dictionary.decompile("nope"), None);
    }
}
