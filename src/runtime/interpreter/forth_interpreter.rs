use std::{ collections::BTreeSet,
           mem::{ replace, take },
           path::PathBuf,
           rc::Rc,
           time::Duration };
use futures::future::{ FutureExt, LocalBoxFuture };
use tracing::{ debug, info, trace, warn };
use crate::{ lang::{ code::{ ByteCode, Op },
                     tokenizing::{ tokenize, Token, TokenKind, TokenList } },
             runtime::{ built_ins::register_all,
                        config::Config,
                        data_structures::{ dictionary::{ Dictionary,
                                                         WordBody,
                                                         WordInfo,
                                                         WordRuntime },
                                           value::{ ToValue, Value } },
                        error::{ self, ForthError },
                        interpreter::{ control::{ ExecutionControl, ExecutionMode },
                                       events::{ EngineEvent, Observer },
                                       CodeManagement,
                                       ControlKind,
                                       Interpreter,
                                       InterpreterStack,
                                       ValueStack,
                                       WordHandler,
                                       WordManagement } } };



/// How a call to `evaluate` ended when it didn't fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome
{
    /// Every token was processed.
    Completed,

    /// The host asked for a stop.  The interpreter has been reset.
    Stopped
}



/// A source being interpreted and how far into its tokens we are.  Parsing words like `SEE` read
/// ahead in the innermost one.
struct TokenContext
{
    tokens: TokenList,
    position: usize
}


/// A library queued by `INCLUDE`, evaluated once the word itself has returned.
struct PendingSource
{
    name: String,
    path: PathBuf,
    source: String
}


/// The run time state of one executing `DO` loop.
struct LoopFrame
{
    limit: i64,
    index: i64
}



/// The interpreter engine.  Owns the stacks, the dictionary and the compile state, and runs source
/// text one token at a time, pausing after each visible step as its `ExecutionControl` directs.
pub struct ForthInterpreter
{
    /// The data stack.
    stack: ValueStack,

    /// The return stack.  While a definition is being compiled the entries above `compile_base`
    /// are the tagged positions control words are waiting to close.
    return_stack: ValueStack,

    dictionary: Dictionary,

    compiling: bool,

    /// The body of the definition being compiled.
    definition: ByteCode,

    /// Name captured from the token after `:`.
    definition_name: Option<String>,

    /// A `( ... -- ... )` comment right after the name becomes the word's stack effect.
    definition_signature: Option<String>,

    compile_base: usize,

    contexts: Vec<TokenContext>,

    pending_source: Option<PendingSource>,

    /// Name of the word being executed, for error messages.
    current_word: String,

    control: ExecutionControl,

    observers: Vec<Box<dyn Observer>>,

    config: Config,

    loaded_libraries: BTreeSet<PathBuf>
}


impl InterpreterStack for ForthInterpreter
{
    fn stack(&self) -> &ValueStack
    {
        &self.stack
    }

    fn stack_mut(&mut self) -> &mut ValueStack
    {
        &mut self.stack
    }

    fn push(&mut self, value: Value)
    {
        self.stack.push(value);
    }

    fn pop(&mut self) -> error::Result<Value>
    {
        match self.stack.pop()
        {
            Some(value) => Ok(value),
            None        => Err(ForthError::stack_underflow(&self.current_word, 1, 0))
        }
    }

    fn peek(&self, index: usize) -> error::Result<Value>
    {
        let depth = self.stack.len();

        if index >= depth
        {
            return Err(ForthError::stack_underflow(&self.current_word, index + 1, depth));
        }

        Ok(self.stack[depth - 1 - index].clone())
    }

    fn pop_as_int(&mut self) -> error::Result<i64>
    {
        match self.pop()?
        {
            Value::Int(value) => Ok(value),
            other             => Err(ForthError::type_mismatch(&self.current_word, "an integer", &other))
        }
    }

    fn pop_as_string(&mut self) -> error::Result<String>
    {
        match self.pop()?
        {
            Value::String(value) => Ok(value),
            other                => Err(ForthError::type_mismatch(&self.current_word, "a string", &other))
        }
    }

    fn return_stack(&self) -> &ValueStack
    {
        &self.return_stack
    }

    fn rpush(&mut self, value: Value)
    {
        self.return_stack.push(value);
    }

    fn rpop(&mut self) -> error::Result<Value>
    {
        match self.return_stack.pop()
        {
            Some(value) => Ok(value),
            None        => Err(ForthError::stack_underflow(&self.current_word, 1, 0))
        }
    }

    fn rpeek(&self) -> error::Result<Value>
    {
        match self.return_stack.last()
        {
            Some(value) => Ok(value.clone()),
            None        => Err(ForthError::stack_underflow(&self.current_word, 1, 0))
        }
    }
}


impl CodeManagement for ForthInterpreter
{
    fn is_compiling(&self) -> bool
    {
        self.compiling
    }

    fn next_token(&mut self) -> error::Result<Token>
    {
        let missing = ForthError::MissingName { word: self.current_word.clone() };

        let Some(context) = self.contexts.last_mut() else
            {
                return Err(missing);
            };

        while let Some(token) = context.tokens.get(context.position)
        {
            if token.is_end_of_input()
            {
                break;
            }

            let token = token.clone();
            context.position += 1;

            if !token.is_comment()
            {
                return Ok(token);
            }
        }

        Err(missing)
    }

    fn next_token_word(&mut self) -> error::Result<String>
    {
        let token = self.next_token()?;

        match token.word()
        {
            Some(word) => Ok(word.to_string()),
            None       => Err(ForthError::MissingName { word: self.current_word.clone() })
        }
    }

    fn next_token_string(&mut self) -> error::Result<String>
    {
        let token = self.next_token()?;

        match token.kind()
        {
            TokenKind::String(text) => Ok(text.clone()),
            _                       => Err(ForthError::MissingName { word: self.current_word.clone() })
        }
    }

    fn here(&self) -> usize
    {
        self.definition.len()
    }

    fn insert_instruction(&mut self, op: Op)
    {
        self.definition.push(op);
    }

    fn definition_mut(&mut self) -> &mut ByteCode
    {
        &mut self.definition
    }

    fn push_control(&mut self, position: usize, kind: ControlKind)
    {
        self.return_stack.push(position.to_value());
        self.return_stack.push(Value::Int(kind.tag()));
    }

    fn pop_control(&mut self, kind: ControlKind, word: &str, missing: &str) -> error::Result<usize>
    {
        if self.return_stack.len() < self.compile_base + 2
        {
            return Err(ForthError::control_structure(word, missing));
        }

        let tag = self.return_stack.pop();
        let position = self.return_stack.pop();

        match (tag, position)
        {
            (Some(Value::Int(tag)), Some(Value::Int(position)))
                if ControlKind::from_tag(tag) == Some(kind) && position >= 0 => Ok(position as usize),

            _ => Err(ForthError::control_structure(word, missing))
        }
    }

    fn queue_source(&mut self, name: String, path: PathBuf, source: String)
    {
        self.pending_source = Some(PendingSource { name, path, source });
    }
}


impl WordManagement for ForthInterpreter
{
    fn add_word(&mut self,
                name: String,
                handler: Rc<WordHandler>,
                description: String,
                signature: String,
                runtime: WordRuntime)
    {
        self.dictionary.define(WordInfo
            {
                name,
                body: WordBody::Native(handler),
                runtime,
                description,
                signature
            });
    }

    fn find_word(&self, word: &str) -> Option<Rc<WordInfo>>
    {
        self.dictionary.lookup(word)
    }

    fn dictionary(&self) -> &Dictionary
    {
        &self.dictionary
    }

    fn dictionary_mut(&mut self) -> &mut Dictionary
    {
        &mut self.dictionary
    }

    fn current_word(&self) -> &str
    {
        &self.current_word
    }
}


impl Interpreter for ForthInterpreter
{
    fn output(&mut self, text: &str)
    {
        self.notify(EngineEvent::Output(text.to_string()));
    }

    fn clear_stack(&mut self)
    {
        self.stack.clear();
        self.notify(EngineEvent::StateChanged);
    }

    fn config(&self) -> &Config
    {
        &self.config
    }

    fn loaded_libraries(&self) -> &BTreeSet<PathBuf>
    {
        &self.loaded_libraries
    }

    fn loaded_libraries_mut(&mut self) -> &mut BTreeSet<PathBuf>
    {
        &mut self.loaded_libraries
    }
}


impl Default for ForthInterpreter
{
    fn default() -> Self
    {
        Self::new()
    }
}


impl ForthInterpreter
{
    /// Create an interpreter configured from the environment, with all of the built in words
    /// registered.
    pub fn new() -> ForthInterpreter
    {
        Self::with_config(Config::from_env())
    }

    pub fn with_config(config: Config) -> ForthInterpreter
    {
        let mut interpreter = ForthInterpreter
            {
                stack: ValueStack::with_capacity(20),
                return_stack: ValueStack::new(),

                dictionary: Dictionary::new(),

                compiling: false,
                definition: ByteCode::new(),
                definition_name: None,
                definition_signature: None,
                compile_base: 0,

                contexts: Vec::new(),
                pending_source: None,
                current_word: String::new(),

                control: ExecutionControl::new(config.delay),
                observers: Vec::new(),

                config,
                loaded_libraries: BTreeSet::new()
            };

        register_all(&mut interpreter);
        interpreter
    }

    /// Register a receiver for the interpreter's events.
    pub fn add_observer(&mut self, observer: Box<dyn Observer>)
    {
        self.observers.push(observer);
    }

    /// A handle the host can keep to pace or stop the interpreter while `evaluate` is running.
    pub fn control(&self) -> ExecutionControl
    {
        self.control.clone()
    }

    pub fn mode(&self) -> ExecutionMode
    {
        self.control.mode()
    }

    pub fn set_mode(&self, mode: ExecutionMode)
    {
        self.control.set_mode(mode);
    }

    /// Pause for this many milliseconds after every visible step while running.
    pub fn set_delay(&self, milliseconds: u64)
    {
        self.control.set_delay(Duration::from_millis(milliseconds));
    }

    pub fn step(&self)
    {
        self.control.step();
    }

    pub fn stop(&self)
    {
        self.control.stop();
    }

    /// Empty both stacks and abandon any definition being compiled.  The dictionary is kept.
    pub fn reset(&mut self)
    {
        self.stack.clear();
        self.return_stack.clear();

        self.compiling = false;
        self.definition.clear();
        self.definition_name = None;
        self.definition_signature = None;
        self.compile_base = 0;

        self.pending_source = None;

        self.notify(EngineEvent::StateChanged);
    }

    /// Empty the data stack.
    pub fn clear(&mut self)
    {
        self.clear_stack();
    }

    /// Tokenize and run the source.  Errors are reported to the observers and then returned, the
    /// stacks are left as they were when the error happened.  A stop request ends the evaluation
    /// early with `Outcome::Stopped` after resetting the interpreter.
    pub async fn evaluate(&mut self, source: &str) -> error::Result<Outcome>
    {
        self.control.clear_stop();

        match self.interpret_source(source).await
        {
            Ok(()) => Ok(Outcome::Completed),

            Err(ForthError::Halted) =>
                {
                    info!("evaluation stopped");

                    self.reset();
                    self.control.set_mode(ExecutionMode::Run);

                    Ok(Outcome::Stopped)
                },

            Err(error) =>
                {
                    debug!(%error, "evaluation failed");

                    self.pending_source = None;
                    self.notify(EngineEvent::Error(error.format_message()));

                    Err(error)
                }
        }
    }

    fn notify(&mut self, event: EngineEvent)
    {
        for observer in self.observers.iter_mut()
        {
            observer.notify(&event);
        }
    }

    /// Run source text without reporting errors, used for both top level evaluation and included
    /// libraries.
    async fn interpret_source(&mut self, source: &str) -> error::Result<()>
    {
        self.contexts.push(TokenContext { tokens: tokenize(source), position: 0 });

        let result = self.run_tokens().await;

        let _ = self.contexts.pop();
        result
    }

    fn next_context_token(&mut self) -> Option<Token>
    {
        let context = self.contexts.last_mut()?;
        let token = context.tokens.get(context.position)?.clone();

        context.position += 1;
        Some(token)
    }

    async fn run_tokens(&mut self) -> error::Result<()>
    {
        while let Some(token) = self.next_context_token()
        {
            self.control.check_stop()?;

            match token.kind()
            {
                TokenKind::EndOfInput      => break,
                TokenKind::Comment(_)      => self.process_comment(&token),
                TokenKind::Number(number)  => self.process_literal(number.to_value()).await?,
                TokenKind::String(text)    => self.process_literal(text.to_value()).await?,
                TokenKind::Word(word)      => self.process_word(word).await?
            }
        }

        Ok(())
    }

    /// A stack effect comment directly after a new word's name is kept as the word's signature.
    fn process_comment(&mut self, token: &Token)
    {
        if    self.compiling
           && self.definition_name.is_some()
           && self.definition_signature.is_none()
           && self.definition.is_empty()
           && token.raw().contains("--")
        {
            self.definition_signature = Some(token.raw().to_string());
        }
    }

    async fn process_literal(&mut self, value: Value) -> error::Result<()>
    {
        if self.compiling
        {
            self.definition.push(Op::PushLiteral(value));
            return Ok(());
        }

        self.push_literal(value);
        self.control.checkpoint().await
    }

    fn push_literal(&mut self, value: Value)
    {
        let name = value.to_string();

        self.notify(EngineEvent::WordStarting { name: name.clone(),
                                                stack_effect: value.literal_effect().to_string() });
        self.stack.push(value);
        self.notify(EngineEvent::WordComplete { name, stack: self.stack.clone() });
    }

    async fn process_word(&mut self, word: &str) -> error::Result<()>
    {
        if word == ":"
        {
            self.start_definition();
            return Ok(());
        }

        if word == ";"
        {
            if !self.compiling
            {
                return Err(ForthError::CompileOnly { word: ";".to_string() });
            }

            return self.end_definition();
        }

        if self.compiling && self.definition_name.is_none()
        {
            self.definition_name = Some(word.to_uppercase());
            return Ok(());
        }

        let Some(info) = self.dictionary.lookup(word) else
            {
                return Err(self.unknown_word(word));
            };

        if info.is_immediate() || !self.compiling
        {
            trace!(word = %info.name, "executing");

            self.execute_entry(info).await?;
            self.control.checkpoint().await
        }
        else
        {
            trace!(word = %info.name, "compiling");

            self.definition.push(Op::Execute(info.name.clone()));
            Ok(())
        }
    }

    fn unknown_word(&self, word: &str) -> ForthError
    {
        let suggestions = self.dictionary.find_similar(word, 3);

        if suggestions.is_empty() && looks_numeric(word)
        {
            return ForthError::InvalidNumber { text: word.to_string() };
        }

        ForthError::UnknownWord { word: word.to_string(), suggestions }
    }

    fn start_definition(&mut self)
    {
        // A `:` inside an open definition abandons it.
        if self.compiling
        {
            self.return_stack.truncate(self.compile_base);
        }

        self.compiling = true;
        self.definition.clear();
        self.definition_name = None;
        self.definition_signature = None;
        self.compile_base = self.return_stack.len();

        self.notify(EngineEvent::StateChanged);
    }

    fn end_definition(&mut self) -> error::Result<()>
    {
        let definition = take(&mut self.definition);
        let name = self.definition_name.take();
        let signature = self.definition_signature.take().unwrap_or_default();

        let pending: Vec<Value> = self.return_stack.drain(self.compile_base.min(self.return_stack.len())..)
                                                   .collect();

        self.compiling = false;
        self.notify(EngineEvent::StateChanged);

        if let Some(error) = unbalanced_definition(&definition, &pending)
        {
            return Err(error);
        }

        if let Some(name) = name
        {
            debug!(word = %name, instructions = definition.len(), "defined word");

            self.dictionary.define(WordInfo
                {
                    name,
                    body: WordBody::Compiled(Rc::new(definition)),
                    runtime: WordRuntime::Normal,
                    description: String::new(),
                    signature
                });
        }

        Ok(())
    }

    /// Run a dictionary entry, reporting its start and completion to the observers.  Boxed because
    /// compiled words call back into it.
    fn execute_entry(&mut self, info: Rc<WordInfo>) -> LocalBoxFuture<'_, error::Result<()>>
    {
        async move
            {
                self.control.check_stop()?;

                self.notify(EngineEvent::WordStarting { name: info.name.clone(),
                                                        stack_effect: info.signature.clone() });

                let previous = replace(&mut self.current_word, info.name.clone());

                let result = match &info.body
                    {
                        WordBody::Native(handler) =>
                            {
                                let handler = handler.clone();
                                handler(self)
                            },

                        WordBody::Compiled(code) => self.execute_code(code).await
                    };

                self.current_word = previous;
                result?;

                self.run_pending_source().await?;

                self.notify(EngineEvent::WordComplete { name: info.name.clone(),
                                                        stack: self.stack.clone() });
                Ok(())
            }
            .boxed_local()
    }

    /// Evaluate a library queued by `INCLUDE`.  A library that fails is forgotten so that it can be
    /// included again once fixed.
    async fn run_pending_source(&mut self) -> error::Result<()>
    {
        let Some(pending) = self.pending_source.take() else
            {
                return Ok(());
            };

        debug!(path = %pending.path.display(), "loading library");

        match self.interpret_source(&pending.source).await
        {
            Ok(()) =>
                {
                    self.output(&format!("Library '{}' loaded successfully.\n", pending.name));
                    Ok(())
                },

            Err(error) =>
                {
                    let _ = self.loaded_libraries.remove(&pending.path);
                    Err(error)
                }
        }
    }

    /// Run a compiled word's threaded code.
    async fn execute_code(&mut self, code: &ByteCode) -> error::Result<()>
    {
        let mut loops: Vec<LoopFrame> = Vec::new();
        let mut pc = 0;

        while pc < code.len()
        {
            self.control.check_stop()?;

            let mut next = pc + 1;
            let mut pause = true;

            match &code[pc]
            {
                Op::PushLiteral(value) => self.push_literal(value.clone()),

                Op::PrintString(text) => self.output(text),

                Op::Jump(target) =>
                    {
                        next = branch_target(target, "ELSE")?;
                        pause = false;
                    },

                Op::JumpIfZero(target) =>
                    {
                        let target = branch_target(target, "IF")?;
                        let word = if target <= pc { "UNTIL" } else { "IF" };

                        if !self.pop_flag(word)?
                        {
                            next = target;
                        }

                        pause = false;
                    },

                Op::LoopStart =>
                    {
                        self.notify_starting("DO", "( limit index -- )");

                        self.require(2, "DO")?;
                        let index = self.pop_int_for("DO")?;
                        let limit = self.pop_int_for("DO")?;

                        loops.push(LoopFrame { limit, index });

                        self.notify_complete("DO");
                    },

                Op::LoopEnd(start) =>
                    {
                        let frame = loops.last_mut()
                                         .ok_or_else(|| ForthError::control_structure("LOOP", "DO"))?;

                        frame.index = frame.index.wrapping_add(1);

                        if frame.index >= frame.limit
                        {
                            let _ = loops.pop();
                        }
                        else
                        {
                            next = *start;
                        }

                        pause = false;
                    },

                Op::PlusLoopEnd(start) =>
                    {
                        self.notify_starting("+LOOP", "( n -- )");
                        let increment = self.pop_int_for("+LOOP")?;
                        self.notify_complete("+LOOP");

                        let frame = loops.last_mut()
                                         .ok_or_else(|| ForthError::control_structure("+LOOP", "DO"))?;

                        frame.index = frame.index.wrapping_add(increment);

                        let finished =    (increment > 0 && frame.index >= frame.limit)
                                       || (increment < 0 && frame.index <= frame.limit);

                        if finished
                        {
                            let _ = loops.pop();
                        }
                        else
                        {
                            next = *start;
                        }
                    },

                Op::LoopIndex =>
                    {
                        let index = loops.last().map(|frame| frame.index);
                        self.push_loop_index("I", index);
                    },

                Op::OuterLoopIndex =>
                    {
                        let index = loops.len()
                                         .checked_sub(2)
                                         .and_then(|outer| loops.get(outer))
                                         .map(|frame| frame.index);
                        self.push_loop_index("J", index);
                    },

                Op::Unloop =>
                    {
                        let _ = loops.pop();
                        pause = false;
                    },

                Op::Leave =>
                    {
                        let _ = loops.pop();
                        next = past_loop_end(code, pc);
                        pause = false;
                    },

                Op::Exit => return Ok(()),

                Op::Execute(name) =>
                    {
                        match self.dictionary.lookup(name)
                        {
                            Some(info) => self.execute_entry(info).await?,
                            None =>
                                {
                                    warn!(word = %name, "compiled call to a word that no longer exists");
                                    pause = false;
                                }
                        }
                    }
            }

            if pause
            {
                self.control.checkpoint().await?;
            }

            pc = next;
        }

        Ok(())
    }

    fn notify_starting(&mut self, name: &str, stack_effect: &str)
    {
        self.notify(EngineEvent::WordStarting { name: name.to_string(),
                                                stack_effect: stack_effect.to_string() });
    }

    fn notify_complete(&mut self, name: &str)
    {
        self.notify(EngineEvent::WordComplete { name: name.to_string(), stack: self.stack.clone() });
    }

    fn push_loop_index(&mut self, name: &str, index: Option<i64>)
    {
        self.notify_starting(name, "( -- n )");

        if let Some(index) = index
        {
            self.stack.push(Value::Int(index));
        }

        self.notify_complete(name);
    }

    fn pop_int_for(&mut self, word: &str) -> error::Result<i64>
    {
        match self.stack.pop()
        {
            Some(Value::Int(value)) => Ok(value),
            Some(other)             => Err(ForthError::type_mismatch(word, "an integer", &other)),
            None                    => Err(ForthError::stack_underflow(word, 1, 0))
        }
    }

    fn pop_flag(&mut self, word: &str) -> error::Result<bool>
    {
        match self.stack.pop()
        {
            Some(value) => value.as_flag()
                                .ok_or_else(|| ForthError::type_mismatch(word, "a flag", &value)),
            None        => Err(ForthError::stack_underflow(word, 1, 0))
        }
    }
}


/// A branch that was never patched means the definition was malformed, it must never be followed.
fn branch_target(target: &Option<usize>, word: &str) -> error::Result<usize>
{
    target.ok_or_else(|| ForthError::control_structure(word, "THEN"))
}


/// Find where execution continues after `LEAVE`: just past the loop end matching the innermost
/// loop, skipping over any loops nested after the `LEAVE`.
fn past_loop_end(code: &ByteCode, pc: usize) -> usize
{
    let mut depth = 0usize;

    for (index, op) in code.iter().enumerate().skip(pc + 1)
    {
        match op
        {
            Op::LoopStart => depth += 1,

            Op::LoopEnd(_) | Op::PlusLoopEnd(_) =>
                {
                    if depth == 0
                    {
                        return index + 1;
                    }

                    depth -= 1;
                },

            _ => {}
        }
    }

    code.len()
}


/// Work out what is missing from a definition closed with `;`, if anything.  `pending` holds the
/// tagged control positions still waiting for their closing word.
fn unbalanced_definition(definition: &ByteCode, pending: &[Value]) -> Option<ForthError>
{
    if let [ .., Value::Int(position), Value::Int(tag) ] = pending
    {
        let opener = usize::try_from(*position).ok().and_then(|position| definition.get(position));

        return Some(match (ControlKind::from_tag(*tag), opener)
            {
                (Some(ControlKind::Do), _)                     => ForthError::control_structure("DO", "LOOP"),
                (Some(ControlKind::Branch), Some(Op::Jump(_))) => ForthError::control_structure("ELSE", "THEN"),
                (Some(ControlKind::Branch), _)                 => ForthError::control_structure("IF", "THEN"),
                _                                              => ForthError::control_structure("BEGIN", "UNTIL")
            });
    }

    if !pending.is_empty()
    {
        return Some(ForthError::control_structure("BEGIN", "UNTIL"));
    }

    definition.iter()
              .find(|op| op.is_unpatched())
              .map(|op| match op
                  {
                      Op::Jump(_) => ForthError::control_structure("ELSE", "THEN"),
                      _           => ForthError::control_structure("IF", "THEN")
                  })
}


/// Does the text look like a number that failed to parse?
fn looks_numeric(text: &str) -> bool
{
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut chars = digits.chars();

    match chars.next()
    {
        Some('$')                   => chars.next().is_some(),
        Some(first) if first.is_ascii_digit() => true,
        _                           => false
    }
}
