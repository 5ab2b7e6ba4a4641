//! Loads and checks the specification fixtures under tests/fixtures/.
//!
//! valid/*.gluer must load cleanly and check without errors against the
//! A/B test hierarchy. invalid/*.gluer must fail with the message stored in
//! the matching .expected file.

use gluer_core::{
    load_spec_files, load_specs, AdapterDescriptor, AdapterLibrary, CheckReport, Checker,
    ClassModel, FieldInfo, Hierarchy, InMemoryProvider, MethodInfo, TypeOracle, Wiring,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn collect(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == ext))
        .collect();
    paths.sort();
    paths
}

// ── Test hierarchy ───────────────────────────────────────────────────

#[derive(Default)]
struct Classes {
    supers: BTreeMap<String, BTreeSet<String>>,
    fields: BTreeMap<(String, String), FieldInfo>,
    methods: BTreeMap<(String, String), MethodInfo>,
}

impl Classes {
    fn class(mut self, name: &str, supers: &[&str]) -> Self {
        self.supers.insert(
            name.to_owned(),
            supers.iter().map(|s| (*s).to_owned()).collect(),
        );
        self
    }

    fn field(mut self, class: &str, name: &str, ty: &str, is_static: bool) -> Self {
        self.fields.insert(
            (class.to_owned(), name.to_owned()),
            FieldInfo {
                ty: ty.to_owned(),
                is_static,
            },
        );
        self
    }

    fn static_method(mut self, class: &str, name: &str, returns: &str) -> Self {
        self.methods.insert(
            (class.to_owned(), name.to_owned()),
            MethodInfo {
                returns: returns.to_owned(),
                is_static: true,
                arity: 0,
            },
        );
        self
    }
}

impl TypeOracle for Classes {
    fn direct_supertypes(&self, name: &str) -> Option<BTreeSet<String>> {
        self.supers.get(name).cloned()
    }
}

impl ClassModel for Classes {
    fn field_type(&self, class: &str, member: &str) -> Option<FieldInfo> {
        self.fields.get(&(class.to_owned(), member.to_owned())).cloned()
    }

    fn method_return_type(&self, class: &str, member: &str) -> Option<MethodInfo> {
        self.methods.get(&(class.to_owned(), member.to_owned())).cloned()
    }
}

const OBJECT: &str = "java.lang.Object";

fn classes() -> Classes {
    Classes::default()
        .class(OBJECT, &[])
        .class("test.modela.SuperSuperA", &[OBJECT])
        .class("test.modela.SuperA", &["test.modela.SuperSuperA"])
        .class("test.modela.A", &["test.modela.SuperA"])
        .class("test.modela.SubA", &["test.modela.A"])
        .class("test.modelb.SuperB", &[OBJECT])
        .class("test.modelb.B", &["test.modelb.SuperB"])
        .class("test.modelb.SubB", &["test.modelb.B"])
        .class("test.modelb.SubSubB", &["test.modelb.SubB"])
        .class("test.modelb.TwiceB", &["test.modelb.B"])
        .class("test.adapter.BtoA", &[OBJECT, "test.modela.A"])
        .class("test.adapter.SubBtoA", &[OBJECT, "test.modela.A"])
        .class("test.adapter.BtoSuperA", &[OBJECT, "test.modela.SuperA"])
        .class("test.adapter.TwiceBtoA1", &[OBJECT, "test.modela.A"])
        .class("test.adapter.TwiceBtoA2", &[OBJECT, "test.modela.A"])
        .class("test.adapter.TwiceBtoA3", &[OBJECT, "test.modela.A"])
        .class("test.Main", &[OBJECT])
        .field("test.Main", "superSuperA", "test.modela.SuperSuperA", false)
        .field("test.Main", "superA", "test.modela.SuperA", false)
        .field("test.Main", "a", "test.modela.A", false)
        .field("test.Main", "twice", "test.modela.A", false)
        .field("test.Main", "subA", "test.modela.SubA", false)
        .class("test.Factory", &[OBJECT])
        .static_method("test.Factory", "makeB", "test.modelb.B")
        .field("test.Factory", "SHARED_B", "test.modelb.B", true)
}

fn adapters(h: &Hierarchy<'_>) -> AdapterLibrary {
    [
        ("test.adapter.BtoA", &["test.modelb.B"][..]),
        (
            "test.adapter.SubBtoA",
            &["test.modelb.SubB", "test.modelb.SubSubB"][..],
        ),
        ("test.adapter.BtoSuperA", &["test.modelb.B"][..]),
        ("test.adapter.TwiceBtoA1", &["test.modelb.B"][..]),
        ("test.adapter.TwiceBtoA2", &["test.modelb.B"][..]),
        ("test.adapter.TwiceBtoA3", &["test.modelb.TwiceB"][..]),
    ]
    .into_iter()
    .map(|(name, from)| AdapterDescriptor::discover(name, from.iter().copied(), h).unwrap())
    .collect()
}

fn check(paths: &[PathBuf]) -> CheckReport {
    let model = classes();
    let h = Hierarchy::new(&model);
    let library = adapters(&h);
    let report = Checker::new(&model, &h, library).check(&load_spec_files(paths));
    report
}

fn wiring_of(report: &CheckReport, field: &str) -> Vec<Wiring> {
    report
        .associations
        .iter()
        .filter(|o| o.association.where_clause.to_string() == format!("field test.Main.{field}"))
        .map(|o| o.wiring.clone())
        .collect()
}

fn resolved(adapter: &str) -> Wiring {
    Wiring::Resolved {
        adapter: format!("test.adapter.{adapter}"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn valid_fixtures_load_cleanly() {
    let paths = collect(&fixtures().join("valid"), "gluer");
    assert_eq!(paths.len(), 3);
    for path in &paths {
        let loaded = load_spec_files(std::slice::from_ref(path));
        assert!(
            loaded.diagnostics.is_empty(),
            "{}: {:?}",
            path.display(),
            loaded.diagnostics
        );
        assert!(!loaded.declarations.is_empty());
    }
}

#[test]
fn invalid_fixtures_fail_with_expected_message() {
    let paths = collect(&fixtures().join("invalid"), "gluer");
    assert!(!paths.is_empty());
    for path in &paths {
        let expected = std::fs::read_to_string(path.with_extension("expected")).unwrap();
        let loaded = load_spec_files(std::slice::from_ref(path));
        assert!(loaded.declarations.is_empty(), "{}", path.display());
        assert_eq!(loaded.diagnostics.len(), 1, "{}", path.display());
        assert_eq!(
            loaded.diagnostics[0].message,
            expected.trim(),
            "{}",
            path.display()
        );
    }
}

#[test]
fn main_fixture_wires_every_field() {
    let report = check(&collect(&fixtures().join("valid"), "gluer"));
    let errors: Vec<_> = report.errors().map(|d| d.to_string()).collect();
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(report.warnings().count(), 0);

    assert_eq!(wiring_of(&report, "superSuperA"), vec![resolved("BtoSuperA")]);
    assert_eq!(
        wiring_of(&report, "superA"),
        vec![resolved("BtoSuperA"), resolved("BtoSuperA")]
    );
    assert_eq!(
        wiring_of(&report, "a"),
        vec![
            Wiring::Explicit {
                adapter: "test.adapter.BtoA".into()
            },
            resolved("SubBtoA"),
        ]
    );
    assert_eq!(wiring_of(&report, "twice"), vec![resolved("TwiceBtoA3")]);
    assert_eq!(wiring_of(&report, "subA"), vec![Wiring::Direct]);
}

#[test]
fn precedence_only_filters_within_the_tie() {
    let provider = InMemoryProvider::default().with_file(
        "tie.gluer",
        "declare precedence test.adapter.TwiceBtoA1 over test.adapter.TwiceBtoA2\n\
         associate field test.Main.a with new test.modelb.B",
    );
    let loaded = load_specs(&[PathBuf::from("tie.gluer")], &provider);
    let model = classes();
    let h = Hierarchy::new(&model);
    let report = Checker::new(&model, &h, adapters(&h)).check(&loaded);

    let errors: Vec<_> = report.errors().map(|d| d.to_string()).collect();
    assert_eq!(
        errors,
        vec![
            "tie.gluer:2 ambiguous adapters: test.adapter.BtoA, test.adapter.TwiceBtoA1 \
             from 'test.modelb.B' to 'test.modela.A'"
        ]
    );
}
