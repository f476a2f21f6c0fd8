//! Modules: one compiled source unit each.
//!
//! A [`Module`] owns the declarations, lexical scope, and top-level
//! initialization code ("startup" list) of one source file. Construction
//! runs three passes over the parsed AST:
//!
//! 1. **Collect** — walk the top-level statements in order: sub, function,
//!    structure, and variable declarations populate the module tables;
//!    `load` statements pull submodules in through the [`Loader`]; every
//!    other statement joins the startup list.
//! 2. **Resolve** — bind every type reference left by pass 1 to a shared
//!    [`TypeInfo`], computing structure layouts along the way.
//! 3. **Lower** — hand the resolved module to the configured
//!    [`Backend`](crate::codegen::Backend), which produces the callable
//!    that [`Module::execute`] runs.
//!
//! Any failure aborts construction; a module is never observable in a
//! half-resolved state.

mod loader;

pub use loader::{ConfigError, LoadError, Loader};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::ast::{Expr, ExprKind, Statement, StatementKind, StatementList, VariableDeclaration};
use crate::codegen::InitFn;
use crate::lexer::{Token, TokenKind};
use crate::semantic::{
    FieldInfo, FunctionInfo, ResolutionError, ScopeId, ScopeSet, StructureInfo, SubInfo,
    TypeExtra, TypeInfo, TypeRef, VariableInfo, Visibility,
};
use crate::source::Location;

/// One compiled source unit.
///
/// Modules are shared through `Rc` — the loader cache and every importer
/// observe the identical module — and are never mutated after
/// construction.
pub struct Module {
    name: String,
    base_path: PathBuf,
    /// Lookup continues here when a name is not in this module's own
    /// tables; every user module's parent is the builtins module.
    parent: Option<Rc<Module>>,
    submodules: HashMap<String, Rc<Module>>,

    types: HashMap<String, Rc<TypeInfo>>,
    subs: HashMap<String, SubInfo>,
    functions: HashMap<String, FunctionInfo>,

    scopes: ScopeSet,
    module_scope: ScopeId,

    startup: StatementList,
    init: Option<InitFn>,
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("base_path", &self.base_path)
            .field("submodules", &self.submodules.keys().collect::<Vec<_>>())
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("subs", &self.subs.keys().collect::<Vec<_>>())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Module {
    /// Builds a module from a parsed AST, running all three construction
    /// passes. `load` statements in the AST re-enter the `loader`.
    pub fn new(
        name: impl Into<String>,
        base_path: impl Into<PathBuf>,
        ast: StatementList,
        loader: &mut Loader,
    ) -> Result<Self, ResolutionError> {
        let mut module = Self::bare(name, base_path);
        module.parent = Some(loader.builtins());

        let structure_order = module.collect(ast, loader)?;
        module.resolve(structure_order)?;

        module.init = Some(loader.backend().lower(&module));

        Ok(module)
    }

    /// Creates an empty module with no parent. Used for the builtins
    /// module and as the starting point of [`Module::new`].
    pub(crate) fn bare(name: impl Into<String>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
            parent: None,
            submodules: HashMap::new(),
            types: HashMap::new(),
            subs: HashMap::new(),
            functions: HashMap::new(),
            scopes: ScopeSet::new(),
            module_scope: ScopeId::ROOT,
            startup: Vec::new(),
            init: None,
        }
    }

    // ==================== Accessors ====================

    /// The module's name (the file name without extension).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path the module was loaded from.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The top-level statements that form the module's initialization
    /// code, in source order.
    pub fn startup(&self) -> &[Statement] {
        &self.startup
    }

    /// The types declared by this module (plus the predefined `string`).
    pub fn types(&self) -> impl Iterator<Item = &Rc<TypeInfo>> {
        self.types.values()
    }

    /// Finds a type in this module, then up the parent chain.
    pub fn find_type(&self, name: &str) -> Option<Rc<TypeInfo>> {
        if let Some(found) = self.types.get(name) {
            return Some(Rc::clone(found));
        }

        self.parent.as_ref().and_then(|parent| parent.find_type(name))
    }

    /// Finds a sub in this module, then up the parent chain.
    pub fn find_sub(&self, name: &str) -> Option<&SubInfo> {
        self.subs
            .get(name)
            .or_else(|| self.parent.as_ref().and_then(|parent| parent.find_sub(name)))
    }

    /// Finds a function in this module, then up the parent chain.
    pub fn find_function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.get(name).or_else(|| {
            self.parent
                .as_ref()
                .and_then(|parent| parent.find_function(name))
        })
    }

    /// Finds a module-scope variable.
    pub fn find_variable(&self, name: &str) -> Option<&VariableInfo> {
        self.scopes.find(self.module_scope, name)
    }

    /// Finds a loaded submodule by its registered name or alias.
    ///
    /// Imported modules' symbols never merge into the importer's tables;
    /// they are reached explicitly through this map.
    pub fn find_submodule(&self, name: &str) -> Option<&Rc<Module>> {
        self.submodules.get(name)
    }

    /// The subs declared by this module.
    pub fn subs(&self) -> impl Iterator<Item = &SubInfo> {
        self.subs.values()
    }

    /// The functions declared by this module.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionInfo> {
        self.functions.values()
    }

    /// Runs the module's lowered initialization code and returns its
    /// status. Exit-failure when no backend output is attached.
    pub fn execute(&self) -> i32 {
        match &self.init {
            Some(init) => init(),
            None => 1,
        }
    }

    // ==================== Pass 1: collect ====================

    /// Walks the top-level statements, populating the module tables and
    /// the startup list. Returns the structure names in declaration order
    /// for pass 2.
    fn collect(
        &mut self,
        ast: StatementList,
        loader: &mut Loader,
    ) -> Result<Vec<String>, ResolutionError> {
        self.seed_implicit_declarations()?;

        let mut structure_order = Vec::new();

        for statement in ast {
            match statement {
                Statement {
                    kind: StatementKind::Sub(declaration),
                    location,
                } => self.add_sub(declaration, location)?,
                Statement {
                    kind: StatementKind::Function(declaration),
                    location,
                } => self.add_function(declaration, location)?,
                Statement {
                    kind: StatementKind::Structure { name, members },
                    location,
                } => {
                    structure_order.push(self.add_structure(name, members, location)?);
                }
                Statement {
                    kind: StatementKind::Variable(declaration),
                    location,
                } => self.add_variable(declaration, location)?,
                Statement {
                    kind: StatementKind::Load { module, alias },
                    location,
                } => self.load_submodule(module, alias, location, loader)?,
                other => {
                    log::debug!("adding statement to {} startup", self.name);
                    self.startup.push(other);
                }
            }
        }

        Ok(structure_order)
    }

    /// Seeds the predefined `string` type and the three implicit
    /// module-scope variables every module carries: an integer `result`
    /// slot and the `name`/`base_path` identity strings.
    fn seed_implicit_declarations(&mut self) -> Result<(), ResolutionError> {
        let u64_type = self
            .parent
            .as_ref()
            .expect("user modules always have the builtins parent")
            .find_type("u64")
            .expect("the builtins module defines u64");

        let string_type = TypeInfo {
            name: "string".to_string(),
            extra: TypeExtra::Structure(StructureInfo {
                fields: vec![
                    FieldInfo {
                        name: "data".to_string(),
                        type_ref: TypeRef::Resolved(Rc::clone(&u64_type)),
                        offset: 0,
                        initializer: None,
                    },
                    FieldInfo {
                        name: "length".to_string(),
                        type_ref: TypeRef::Resolved(u64_type),
                        offset: 8,
                        initializer: None,
                    },
                ],
            }),
            visibility: Visibility::Public,
        };
        self.types.insert("string".to_string(), Rc::new(string_type));

        self.create_variable("result", "i32", TokenKind::LiteralInt, "0")?;

        let name = self.name.clone();
        self.create_variable("name", "string", TokenKind::LiteralString, &name)?;

        let base_path = self.base_path.display().to_string();
        self.create_variable("base_path", "string", TokenKind::LiteralString, &base_path)?;

        Ok(())
    }

    /// Declares a synthesized, literal-initialized module variable through
    /// the ordinary declaration path (so its initializer joins the startup
    /// list like any other).
    fn create_variable(
        &mut self,
        name: &str,
        type_name: &str,
        literal_kind: TokenKind,
        literal_text: &str,
    ) -> Result<(), ResolutionError> {
        let literal = Token::new(literal_kind, literal_text, Location::default());
        let declaration = VariableDeclaration {
            name: Token::identifier(name),
            type_name: Token::identifier(type_name),
            initializer: Some(Expr::new(ExprKind::Literal(literal), Location::default())),
            location: Location::default(),
        };

        self.add_variable(declaration, Location::default())
    }

    fn add_sub(
        &mut self,
        declaration: crate::ast::SubDeclaration,
        location: Location,
    ) -> Result<(), ResolutionError> {
        let info = SubInfo::new(declaration);
        self.ensure_unique(self.subs.contains_key(&info.name), "sub", &info.name, &location)?;

        log::debug!("add sub {}.{}", self.name, info.name);
        self.subs.insert(info.name.clone(), info);

        Ok(())
    }

    fn add_function(
        &mut self,
        declaration: crate::ast::FunctionDeclaration,
        location: Location,
    ) -> Result<(), ResolutionError> {
        let info = FunctionInfo::new(declaration);
        self.ensure_unique(
            self.functions.contains_key(&info.name),
            "function",
            &info.name,
            &location,
        )?;

        log::debug!("add function {}.{}", self.name, info.name);
        self.functions.insert(info.name.clone(), info);

        Ok(())
    }

    fn add_structure(
        &mut self,
        name: Token,
        members: Vec<VariableDeclaration>,
        location: Location,
    ) -> Result<String, ResolutionError> {
        let structure_name = name.text;
        self.ensure_unique(
            self.types.contains_key(&structure_name),
            "structure",
            &structure_name,
            &location,
        )?;

        log::debug!("add structure {}.{}", self.name, structure_name);
        let info = TypeInfo::structure(&structure_name, &members);
        self.types.insert(structure_name.clone(), Rc::new(info));

        Ok(structure_name)
    }

    fn add_variable(
        &mut self,
        declaration: VariableDeclaration,
        location: Location,
    ) -> Result<(), ResolutionError> {
        let variable = VariableInfo::from_declaration(&declaration);

        if let Err(rejected) = self.scopes.insert(self.module_scope, variable) {
            return Err(ResolutionError::DuplicateDefinition {
                kind: "variable",
                name: rejected.name,
                location,
            });
        }

        // An initialized declaration is also runnable code; keep it in the
        // startup list so the backend compiles the initialization in
        // source order.
        if declaration.initializer.is_some() {
            self.startup
                .push(Statement::new(StatementKind::Variable(declaration), location));
        }

        Ok(())
    }

    fn load_submodule(
        &mut self,
        module: Token,
        alias: Option<Token>,
        location: Location,
        loader: &mut Loader,
    ) -> Result<(), ResolutionError> {
        let requested = module.text;
        let key = match alias {
            Some(alias) => alias.text,
            None => requested.clone(),
        };

        if self.submodules.contains_key(&key) {
            return Err(ResolutionError::DuplicateLoad {
                name: key,
                location,
            });
        }

        let loaded =
            loader
                .get_module(Path::new(&requested))
                .map_err(|error| ResolutionError::LoadFailed {
                    name: requested.clone(),
                    location: location.clone(),
                    source: Box::new(error),
                })?;

        log::debug!("module {} registers submodule {} as {}", self.name, requested, key);
        self.submodules.insert(key, loaded);

        Ok(())
    }

    fn ensure_unique(
        &self,
        already_present: bool,
        kind: &'static str,
        name: &str,
        location: &Location,
    ) -> Result<(), ResolutionError> {
        if already_present {
            return Err(ResolutionError::DuplicateDefinition {
                kind,
                name: name.to_string(),
                location: location.clone(),
            });
        }

        Ok(())
    }

    // ==================== Pass 2: resolve ====================

    /// Binds every type reference collected by pass 1: structures first
    /// (in declaration order, following forward references), then module
    /// variables, then sub/function signatures.
    fn resolve(&mut self, structure_order: Vec<String>) -> Result<(), ResolutionError> {
        for name in &structure_order {
            let mut visiting = Vec::new();
            self.resolve_structure(name, &mut visiting)?;
        }

        self.resolve_module_variables()?;
        self.resolve_procedures()?;

        Ok(())
    }

    /// Rebuilds one structure with resolved field types and computed
    /// offsets, memoizing through the type table.
    fn resolve_structure(
        &mut self,
        name: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Rc<TypeInfo>, ResolutionError> {
        let placeholder = self
            .types
            .get(name)
            .cloned()
            .expect("structures are registered before resolution");

        if placeholder.is_fully_resolved() {
            return Ok(placeholder);
        }

        let TypeExtra::Structure(unresolved) = &placeholder.extra else {
            unreachable!("only structures can be unresolved");
        };

        visiting.push(name.to_string());

        let mut fields = Vec::new();
        let mut offset = 0;

        for field in &unresolved.fields {
            let resolved = match &field.type_ref {
                TypeRef::Resolved(info) => Rc::clone(info),
                TypeRef::Named(token) => self.resolve_named_type(token, visiting)?,
            };

            fields.push(FieldInfo {
                name: field.name.clone(),
                type_ref: TypeRef::Resolved(Rc::clone(&resolved)),
                offset,
                initializer: field.initializer.clone(),
            });
            offset += resolved.size();
        }

        visiting.pop();

        let rebuilt = Rc::new(TypeInfo {
            name: placeholder.name.clone(),
            extra: TypeExtra::Structure(StructureInfo { fields }),
            visibility: placeholder.visibility,
        });
        self.types.insert(name.to_string(), Rc::clone(&rebuilt));

        Ok(rebuilt)
    }

    /// Resolves a type name during the structure pass. May recurse into a
    /// structure declared later in the module (a forward reference); a
    /// cycle through `visiting` is a fatal resolution error.
    fn resolve_named_type(
        &mut self,
        token: &Token,
        visiting: &mut Vec<String>,
    ) -> Result<Rc<TypeInfo>, ResolutionError> {
        let name = &token.text;

        if visiting.iter().any(|pending| pending == name) {
            return Err(ResolutionError::RecursiveStructure {
                name: name.clone(),
                location: token.location.clone(),
            });
        }

        if let Some(found) = self.types.get(name).cloned() {
            if found.is_fully_resolved() {
                return Ok(found);
            }
            return self.resolve_structure(name, visiting);
        }

        if let Some(parent) = &self.parent {
            if let Some(found) = parent.find_type(name) {
                return Ok(found);
            }
        }

        Err(ResolutionError::UnresolvedType {
            name: name.clone(),
            location: token.location.clone(),
        })
    }

    /// Looks up an already-resolved type for the post-structure passes.
    fn lookup_resolved_type(&self, token: &Token) -> Result<Rc<TypeInfo>, ResolutionError> {
        self.find_type(&token.text)
            .ok_or_else(|| ResolutionError::UnresolvedType {
                name: token.text.clone(),
                location: token.location.clone(),
            })
    }

    fn resolve_type_ref(&self, type_ref: &mut TypeRef) -> Result<(), ResolutionError> {
        let TypeRef::Named(token) = type_ref else {
            return Ok(());
        };

        let resolved = self.lookup_resolved_type(token)?;
        *type_ref = TypeRef::Resolved(resolved);

        Ok(())
    }

    fn resolve_module_variables(&mut self) -> Result<(), ResolutionError> {
        // The scope set is taken out for the duration so the lookup can
        // borrow the rest of the module.
        let mut scopes = std::mem::take(&mut self.scopes);
        let mut outcome = Ok(());

        for variable in scopes.locals_mut(self.module_scope) {
            if let Err(error) = self.resolve_type_ref(&mut variable.type_ref) {
                outcome = Err(error);
                break;
            }
        }

        self.scopes = scopes;
        outcome
    }

    fn resolve_procedures(&mut self) -> Result<(), ResolutionError> {
        let mut subs = std::mem::take(&mut self.subs);
        let mut outcome = Ok(());

        'subs: for sub in subs.values_mut() {
            for parameter in &mut sub.parameters {
                if let Err(error) = self.resolve_type_ref(&mut parameter.type_ref) {
                    outcome = Err(error);
                    break 'subs;
                }
            }
        }

        self.subs = subs;
        outcome?;

        let mut functions = std::mem::take(&mut self.functions);
        let mut outcome = Ok(());

        'functions: for function in functions.values_mut() {
            for parameter in &mut function.parameters {
                if let Err(error) = self.resolve_type_ref(&mut parameter.type_ref) {
                    outcome = Err(error);
                    break 'functions;
                }
            }

            if let Err(error) = self.resolve_type_ref(&mut function.return_type) {
                outcome = Err(error);
                break 'functions;
            }
        }

        self.functions = functions;
        outcome
    }

    // ==================== Builtins support ====================

    /// Inserts a type directly; used to seed the builtins module.
    pub(crate) fn insert_type(&mut self, info: TypeInfo) {
        self.types.insert(info.name.clone(), Rc::new(info));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenStream;
    use crate::parser::parse_program;

    fn build_module(source: &str) -> Result<Module, ResolutionError> {
        let mut stream = TokenStream::new(source);
        let ast = parse_program(&mut stream).expect("test source parses");
        let mut loader = Loader::new();

        Module::new("test", "test.bas", ast, &mut loader)
    }

    #[test]
    fn test_implicit_variables_are_seeded() {
        let module = build_module("").unwrap();

        let result = module.find_variable("result").unwrap();
        assert_eq!(result.type_ref.name(), "i32");
        assert!(result.type_ref.is_resolved());

        assert_eq!(module.find_variable("name").unwrap().type_ref.name(), "string");
        assert_eq!(
            module.find_variable("base_path").unwrap().type_ref.name(),
            "string"
        );

        // Their initializers are startup code, in seeding order.
        assert_eq!(module.startup().len(), 3);
    }

    #[test]
    fn test_declarations_populate_tables() {
        let module = build_module(
            "var counter as i32\n\
             sub bump() counter = counter + 1 end sub\n\
             function current() as i32 result = counter end function\n\
             structure point x as i32 y as i32 end structure",
        )
        .unwrap();

        assert!(module.find_variable("counter").is_some());
        assert!(module.find_sub("bump").is_some());
        assert!(module.find_function("current").is_some());
        assert!(module.find_type("point").is_some());
    }

    #[test]
    fn test_startup_preserves_source_order() {
        let module = build_module(
            "var a as i32 = 1\n\
             announce()\n\
             var b as i32\n\
             a = 2",
        )
        .unwrap();

        // Three implicit declarations, then: `var a` (initialized),
        // `announce()`, `a = 2`. The uninitialized `var b` contributes no
        // startup code.
        let kinds: Vec<&StatementKind> =
            module.startup().iter().map(|statement| &statement.kind).collect();

        assert_eq!(module.startup().len(), 6);
        assert!(matches!(kinds[3], StatementKind::Variable(declaration)
            if declaration.name.text == "a"));
        assert!(matches!(kinds[4], StatementKind::SubCall { name, .. }
            if name.text == "announce"));
        assert!(matches!(kinds[5], StatementKind::Assignment { name, .. }
            if name.text == "a"));
    }

    #[test]
    fn test_duplicate_sub_is_rejected() {
        let error = build_module(
            "sub foo() end sub\n\
             sub foo() end sub",
        )
        .unwrap_err();

        match error {
            ResolutionError::DuplicateDefinition { kind, name, location } => {
                assert_eq!(kind, "sub");
                assert_eq!(name, "foo");
                assert_eq!(location.line, 2);
            }
            other => panic!("expected a duplicate definition, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_variable_is_rejected() {
        let error = build_module(
            "var x as i32\n\
             var x as f64",
        )
        .unwrap_err();

        assert!(matches!(
            error,
            ResolutionError::DuplicateDefinition { kind: "variable", ref name, .. }
                if name == "x"
        ));
    }

    #[test]
    fn test_structure_layout_is_computed() {
        let module = build_module(
            "structure point\n\
               x as i32\n\
               y as i32\n\
             end structure",
        )
        .unwrap();

        let point = module.find_type("point").unwrap();
        assert_eq!(point.size(), 8);

        let TypeExtra::Structure(info) = &point.extra else {
            panic!("point should be a structure");
        };
        assert_eq!(info.fields[0].offset, 0);
        assert_eq!(info.fields[1].offset, 4);
    }

    #[test]
    fn test_structure_forward_reference_resolves() {
        let module = build_module(
            "structure segment\n\
               head as point\n\
               tail as point\n\
             end structure\n\
             structure point\n\
               x as i64\n\
               y as i64\n\
             end structure",
        )
        .unwrap();

        assert_eq!(module.find_type("segment").unwrap().size(), 32);
    }

    #[test]
    fn test_recursive_structure_is_rejected() {
        let error = build_module(
            "structure node\n\
               next_node as node\n\
             end structure",
        )
        .unwrap_err();

        assert!(matches!(
            error,
            ResolutionError::RecursiveStructure { ref name, .. } if name == "node"
        ));
    }

    #[test]
    fn test_unresolved_type_names_reference() {
        let error = build_module("var x as quaternion").unwrap_err();

        match error {
            ResolutionError::UnresolvedType { name, location } => {
                assert_eq!(name, "quaternion");
                assert_eq!(location.column, 10);
            }
            other => panic!("expected an unresolved type, got {other:?}"),
        }
    }

    #[test]
    fn test_function_signature_is_resolved() {
        let module = build_module(
            "function scale(value as i32, by as f32) as f64 end function",
        )
        .unwrap();

        let function = module.find_function("scale").unwrap();
        assert!(function.parameters.iter().all(|p| p.type_ref.is_resolved()));
        assert_eq!(function.return_type.name(), "f64");
        assert_eq!(function.return_type.resolved().unwrap().size(), 8);
    }

    #[test]
    fn test_builtin_types_reach_user_modules_through_parent() {
        let module = build_module("").unwrap();

        assert!(module.find_type("i8").is_some());
        assert!(module.find_type("f64").is_some());
        assert!(module.find_type("no_such_type").is_none());
    }

    #[test]
    fn test_redefining_the_predefined_string_type_collides() {
        // `string` is seeded into every module's own table, so redefining
        // it collides.
        let error = build_module("structure string x as i32 end structure").unwrap_err();

        assert!(matches!(
            error,
            ResolutionError::DuplicateDefinition { kind: "structure", ref name, .. }
                if name == "string"
        ));
    }

    #[test]
    fn test_execute_without_backend_output_fails() {
        let module = Module::bare("empty", "");
        assert_eq!(module.execute(), 1);
    }

    #[test]
    fn test_execute_runs_lowered_thunk() {
        let module = build_module("").unwrap();
        // The null backend lowers every module to a success thunk.
        assert_eq!(module.execute(), 0);
    }
}
