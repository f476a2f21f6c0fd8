//! The module loader.
//!
//! The [`Loader`] turns module names into [`Module`]s: it resolves names
//! to files through a working-directory stack, reads and parses the file,
//! constructs the module (which may recursively re-enter the loader for
//! nested `load` statements), and memoizes the result by normalized name —
//! a module is loaded and resolved at most once per process, however many
//! importers reference it.
//!
//! ## The working-path stack
//!
//! Relative module names resolve against the top of the working-path
//! stack. Loading a module pushes that module's own directory for the
//! duration of its construction, so a `load` inside a module in `/y`
//! resolves relative to `/y` even when the load was triggered from `/x`;
//! the pop is guaranteed on every exit path, including errors.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use super::Module;
use crate::codegen::{Backend, NullBackend};
use crate::lexer::TokenStream;
use crate::parser::{parse_program, SyntaxError};
use crate::semantic::{ResolutionError, TypeInfo, Visibility};

/// The file extension tried first for bare module names.
const MODULE_EXTENSION: &str = "bas";

/// An invalid loader configuration, detected before any parsing begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The directory does not exist.
    #[error("missing working directory {path}")]
    MissingDirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The path exists but is not a directory.
    #[error("working path {path} is not a directory")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The directory cannot be read.
    #[error("working path {path} is not readable")]
    UnreadableDirectory {
        /// The offending path.
        path: PathBuf,
    },
}

/// An error while loading a module.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The loader was misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A file could not be read.
    #[error("could not read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The module's source failed to lex or parse.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The module's declarations failed to resolve.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// No file for the module exists in the working or system directories.
    #[error("could not find module \"{name}\"")]
    ModuleNotFound {
        /// The requested module name.
        name: String,
    },

    /// The module is part of a `load` cycle.
    #[error("module \"{name}\" is already being loaded; load statements form a cycle")]
    CircularLoad {
        /// The module whose load re-entered itself.
        name: String,
    },
}

/// Resolves, parses, constructs, and caches modules.
pub struct Loader {
    system_path: Option<PathBuf>,
    /// Stack of directories for relative name resolution; the top is the
    /// directory of the module currently being loaded.
    working_path: Vec<PathBuf>,
    cache: HashMap<String, Rc<Module>>,
    /// Names currently mid-construction, for load-cycle detection.
    in_progress: HashSet<String>,
    backend: Box<dyn Backend>,
}

impl Loader {
    /// Creates a loader with the no-op backend.
    pub fn new() -> Self {
        Self::with_backend(Box::new(NullBackend))
    }

    /// Creates a loader that lowers modules through the given backend.
    ///
    /// The cache starts seeded with the `builtins` module, so the ten
    /// numeric primitive types are always available without a `load`.
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        let mut cache = HashMap::new();
        cache.insert("builtins".to_string(), Rc::new(create_builtins()));

        Self {
            system_path: None,
            working_path: Vec::new(),
            cache,
            in_progress: HashSet::new(),
            backend,
        }
    }

    /// The builtins module every user module resolves against.
    pub fn builtins(&self) -> Rc<Module> {
        Rc::clone(self.cache.get("builtins").expect("builtins are seeded at construction"))
    }

    /// The backend used by module pass 3.
    pub(crate) fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Configures the directory searched for system-wide modules after
    /// the working directory misses.
    pub fn set_system_path(&mut self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let path = path.into();
        validate_directory(&path)?;

        log::info!("system path set to {}", path.display());
        self.system_path = Some(path);

        Ok(())
    }

    /// Pushes a directory onto the working-path stack, validating that it
    /// exists, is a directory, and is readable.
    pub fn push_working_path(&mut self, path: &Path) -> Result<(), ConfigError> {
        validate_directory(path)?;
        self.working_path.push(path.to_path_buf());

        Ok(())
    }

    /// Pops the top of the working-path stack.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty; pushes and pops are always paired.
    pub fn pop_working_path(&mut self) {
        self.working_path
            .pop()
            .expect("working-path pops are paired with pushes");
    }

    /// Loads a script by path: the script's directory becomes the working
    /// path for the duration of the load, and the file name is loaded as
    /// a module.
    pub fn get_script(&mut self, script_path: &Path) -> Result<Rc<Module>, LoadError> {
        let absolute = if script_path.is_absolute() {
            script_path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|source| LoadError::Io {
                    path: script_path.to_path_buf(),
                    source,
                })?
                .join(script_path)
        };

        let base_path = absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        let file_name = PathBuf::from(absolute.file_name().ok_or_else(|| {
            LoadError::ModuleNotFound {
                name: script_path.display().to_string(),
            }
        })?);

        self.with_working_path(&base_path, |loader| loader.get_module(&file_name))?
    }

    /// Loads a module by name.
    ///
    /// The name is normalized by stripping any extension; a cached module
    /// is returned as-is. Otherwise the loader tries `<dir>/<name>.bas`
    /// then `<dir>/<name>` in the working directory (and then the system
    /// path, when configured), parses the file, and constructs the module
    /// with the module's own directory pushed as the working path.
    pub fn get_module(&mut self, name: &Path) -> Result<Rc<Module>, LoadError> {
        let module_name = module_name_of(name);

        if let Some(found) = self.cache.get(&module_name) {
            log::debug!("returning cached module {module_name}");
            return Ok(Rc::clone(found));
        }

        if self.in_progress.contains(&module_name) {
            return Err(LoadError::CircularLoad { name: module_name });
        }

        let module_path = self.find_module_path(name, &module_name)?;
        let text = fs::read_to_string(&module_path).map_err(|source| LoadError::Io {
            path: module_path.clone(),
            source,
        })?;

        log::info!(
            "loading module {module_name} from {}",
            module_path.display()
        );

        let mut stream = TokenStream::with_path(&text, module_path.clone());
        let ast = parse_program(&mut stream)?;

        let base_dir = module_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        self.in_progress.insert(module_name.clone());
        let constructed = self.with_working_path(&base_dir, |loader| {
            Module::new(module_name.as_str(), &module_path, ast, loader)
        });
        self.in_progress.remove(&module_name);

        let module = Rc::new(constructed??);
        self.cache.insert(module_name, Rc::clone(&module));

        Ok(module)
    }

    /// Runs `operation` with `path` on top of the working-path stack,
    /// popping it again on every exit path.
    fn with_working_path<T>(
        &mut self,
        path: &Path,
        operation: impl FnOnce(&mut Self) -> T,
    ) -> Result<T, ConfigError> {
        self.push_working_path(path)?;
        let value = operation(self);
        self.pop_working_path();

        Ok(value)
    }

    /// Resolves a module name to an existing file: `<name>.bas` first,
    /// then the bare `<name>`, in the working directory and then the
    /// system path.
    fn find_module_path(&self, name: &Path, module_name: &str) -> Result<PathBuf, LoadError> {
        let with_extension = ensure_extension(name);
        let bare = name.with_extension("");

        let mut directories: Vec<&Path> = Vec::new();
        if let Some(top) = self.working_path.last() {
            directories.push(top);
        }
        if let Some(system) = &self.system_path {
            directories.push(system);
        }

        for directory in directories {
            for candidate in [&with_extension, &bare] {
                let path = directory.join(candidate);
                if path.is_file() {
                    return Ok(path);
                }
            }
        }

        Err(LoadError::ModuleNotFound {
            name: module_name.to_string(),
        })
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The normalized module name: the file name with any extension removed.
fn module_name_of(name: &Path) -> String {
    name.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string_lossy().into_owned())
}

/// Appends the default extension to names that have none.
fn ensure_extension(name: &Path) -> PathBuf {
    if name.extension().is_some() {
        name.to_path_buf()
    } else {
        name.with_extension(MODULE_EXTENSION)
    }
}

fn validate_directory(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingDirectory {
            path: path.to_path_buf(),
        });
    }

    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    if fs::read_dir(path).is_err() {
        return Err(ConfigError::UnreadableDirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Builds the `builtins` module: the ten numeric primitive types, all
/// public, available to every module without an explicit `load`.
fn create_builtins() -> Module {
    let mut builtins = Module::bare("builtins", "");

    let mut add_number =
        |name: &str, is_signed: bool, is_floating_point: bool, size: usize| {
            builtins.insert_type(TypeInfo::number(
                name,
                is_signed,
                is_floating_point,
                size,
                Visibility::Public,
            ));
        };

    add_number("i8", true, false, 1);
    add_number("u8", false, false, 1);

    add_number("i16", true, false, 2);
    add_number("u16", false, false, 2);

    add_number("i32", true, false, 4);
    add_number("u32", false, false, 4);

    add_number("i64", true, false, 8);
    add_number("u64", false, false, 8);

    add_number("f32", true, true, 4);
    add_number("f64", true, true, 8);

    builtins
}
