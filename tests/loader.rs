//! Integration tests for the module loader.
//!
//! These drive the loader end to end over fixture modules committed under
//! `tests/fixtures/`: caching and identity, working-path scoping across
//! directories, name resolution, and failure modes.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use basil::module::{LoadError, Loader};
use basil::semantic::ResolutionError;

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}

/// Walks an error's source chain and returns every message, outermost
/// first.
fn error_chain(error: &dyn Error) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();

    while let Some(inner) = current {
        messages.push(inner.to_string());
        current = inner.source();
    }

    messages
}

#[test]
fn loads_a_standalone_script() {
    let mut loader = Loader::new();
    let module = loader.get_script(&fixture("simple.bas")).unwrap();

    assert_eq!(module.name(), "simple");
    assert!(module.find_variable("total").is_some());
    assert!(module.find_sub("bump").is_some());
    assert!(module.find_function("doubled").is_some());
    assert_eq!(module.find_type("point").unwrap().size(), 8);

    // Three implicit declarations, the initialized `total`, and the
    // top-level `bump(3)` call.
    assert_eq!(module.startup().len(), 5);

    // The null backend lowers everything to a success thunk.
    assert_eq!(module.execute(), 0);
}

#[test]
fn script_loads_are_memoized() {
    let mut loader = Loader::new();

    let first = loader.get_script(&fixture("simple.bas")).unwrap();
    let second = loader.get_script(&fixture("simple.bas")).unwrap();

    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn two_importers_observe_the_identical_module() {
    let mut loader = Loader::new();
    let app = loader.get_script(&fixture("memo/app.bas")).unwrap();

    let lib_a = app.find_submodule("lib_a").unwrap();
    let lib_b = app.find_submodule("lib_b").unwrap();

    let common_via_a = lib_a.find_submodule("common").unwrap();
    let common_via_b = lib_b.find_submodule("common").unwrap();

    // `common` was loaded and resolved exactly once; both importers share
    // the identical module.
    assert!(Rc::ptr_eq(common_via_a, common_via_b));
    assert!(common_via_a.find_variable("token").is_some());
}

#[test]
fn nested_loads_resolve_relative_to_the_nested_module() {
    let mut loader = Loader::new();
    // Module `b` lives in scoping/y, reachable only via the system path.
    loader
        .set_system_path(fixture("scoping/y"))
        .expect("fixture directory exists");

    let a = loader.get_script(&fixture("scoping/x/a.bas")).unwrap();

    // While `b` (in y/) was loading, its own directory was the working
    // path, so its `load y_helper` picked y/y_helper.bas over the decoy
    // x/y_helper.bas.
    let b = a.find_submodule("b").unwrap();
    let helper = b.find_submodule("y_helper").unwrap();
    assert!(helper.find_sub("right_one").is_some());
    assert!(helper.find_sub("wrong_one").is_none());

    // And after `b` finished, `a`'s own loads resolve relative to x/
    // again: x_only.bas exists only there.
    assert!(a.find_submodule("x_only").is_some());
}

#[test]
fn missing_module_is_reported_through_the_load_chain() {
    let mut loader = Loader::new();
    let error = loader
        .get_script(&fixture("missing_load.bas"))
        .unwrap_err();

    let chain = error_chain(&error);
    assert!(chain[0].contains("could not load module \"nowhere\""));
    assert!(chain
        .iter()
        .any(|message| message.contains("could not find module \"nowhere\"")));
}

#[test]
fn load_cycles_are_rejected() {
    let mut loader = Loader::new();
    let error = loader
        .get_script(&fixture("circular/ring_a.bas"))
        .unwrap_err();

    let chain = error_chain(&error);
    assert!(chain
        .iter()
        .any(|message| message.contains("load statements form a cycle")));
}

#[test]
fn extension_is_preferred_over_bare_file() {
    let mut loader = Loader::new();
    let main = loader.get_script(&fixture("ext/main.bas")).unwrap();

    // Both ext/dual.bas and a bare ext/dual exist; `.bas` wins.
    let dual = main.find_submodule("dual").unwrap();
    assert!(dual.find_sub("from_bas").is_some());
    assert!(dual.find_sub("from_bare").is_none());
}

#[test]
fn load_alias_registers_under_the_alias() {
    let mut loader = Loader::new();
    let main = loader.get_script(&fixture("alias/main.bas")).unwrap();

    assert!(main.find_submodule("shared_stuff").is_some());
    assert!(main.find_submodule("common").is_none());
}

#[test]
fn loading_the_same_name_twice_is_rejected() {
    let mut loader = Loader::new();
    let error = loader.get_script(&fixture("dup/main.bas")).unwrap_err();

    match error {
        LoadError::Resolution(ResolutionError::DuplicateLoad { name, location }) => {
            assert_eq!(name, "common");
            assert_eq!(location.line, 2);
        }
        other => panic!("expected a duplicate load error, got {other:?}"),
    }
}

#[test]
fn builtins_are_always_available() {
    let loader = Loader::new();
    let builtins = loader.builtins();

    assert_eq!(builtins.types().count(), 10);

    let i32_info = builtins.find_type("i32").unwrap();
    let number = i32_info.as_number().unwrap();
    assert!(number.is_signed);
    assert!(!number.is_floating_point);
    assert_eq!(number.size, 4);
}

#[test]
fn missing_script_directory_is_a_config_error() {
    let mut loader = Loader::new();
    let error = loader
        .get_script(Path::new("/no/such/dir/anywhere/script.bas"))
        .unwrap_err();

    assert!(matches!(error, LoadError::Config(_)));
}
