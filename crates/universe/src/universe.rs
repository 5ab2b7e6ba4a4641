//! Loading a type universe and answering class questions from it.
//!
//! The main entry points are [`Universe::from_json_str`] and
//! [`Universe::from_path`]. A loaded universe is the [`ClassModel`] the
//! checker consults and the source of its [`AdapterLibrary`].

use crate::types::*;
use gluer_core::{
    AdapterDescriptor, AdapterLibrary, ClassModel, FieldInfo, Hierarchy, HierarchyError,
    MethodInfo, TypeOracle,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Errors while loading a universe or discovering its adapters.
#[derive(Debug, thiserror::Error)]
pub enum UniverseError {
    #[error("cannot read universe '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid universe document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("class '{class}' names undeclared supertype '{supertype}'")]
    UnknownSupertype { class: String, supertype: String },

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    doc: UniverseDoc,
}

impl Universe {
    pub fn from_doc(doc: UniverseDoc) -> Result<Self, UniverseError> {
        for (class, decl) in &doc.classes {
            if let Some(missing) = decl
                .supertypes
                .iter()
                .find(|s| !doc.classes.contains_key(s.as_str()))
            {
                return Err(UniverseError::UnknownSupertype {
                    class: class.clone(),
                    supertype: missing.clone(),
                });
            }
        }
        info!(classes = doc.classes.len(), "universe loaded");
        Ok(Universe { doc })
    }

    pub fn from_json_str(src: &str) -> Result<Self, UniverseError> {
        Self::from_doc(serde_json::from_str(src)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, UniverseError> {
        let src = std::fs::read_to_string(path).map_err(|source| UniverseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&src)
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.doc.classes.get(name)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.doc.classes.keys().map(String::as_str)
    }

    /// Classes marked as adapters, with or without a usable constructor.
    pub fn adapter_classes(&self) -> impl Iterator<Item = (&str, &ClassDecl)> {
        self.doc
            .classes
            .iter()
            .filter(|(_, c)| c.adapter)
            .map(|(name, c)| (name.as_str(), c))
    }

    /// Build the adapter library from every adapter class that has at least
    /// one single-argument constructor. The rest are left to
    /// [`Universe::adapter_shape_problems`].
    pub fn adapter_library(
        &self,
        hierarchy: &Hierarchy<'_>,
    ) -> Result<AdapterLibrary, UniverseError> {
        let mut library = AdapterLibrary::new();
        for (name, class) in self.adapter_classes() {
            let params: BTreeSet<&str> = class.single_arg_constructors().collect();
            if params.is_empty() {
                continue;
            }
            let descriptor = AdapterDescriptor::discover(name, params, hierarchy)?;
            debug!(adapter = name, from = ?descriptor.adapts_from, "adapter discovered");
            library.insert(descriptor);
        }
        info!(adapters = library.len(), "adapter library built");
        Ok(library)
    }

    /// One message per adapter class that cannot be constructed from a
    /// single object.
    pub fn adapter_shape_problems(&self) -> Vec<String> {
        self.adapter_classes()
            .filter(|(_, c)| c.single_arg_constructors().next().is_none())
            .map(|(name, _)| {
                format!(
                    "adapter '{}' lacks required constructor shape: no single-argument constructor",
                    name
                )
            })
            .collect()
    }
}

impl TypeOracle for Universe {
    fn direct_supertypes(&self, name: &str) -> Option<BTreeSet<String>> {
        self.class(name)
            .map(|c| c.supertypes.iter().cloned().collect())
    }
}

impl ClassModel for Universe {
    fn field_type(&self, class: &str, member: &str) -> Option<FieldInfo> {
        let field = self.class(class)?.fields.get(member)?;
        Some(FieldInfo {
            ty: field.ty.clone(),
            is_static: field.is_static,
        })
    }

    fn method_return_type(&self, class: &str, member: &str) -> Option<MethodInfo> {
        let method = self.class(class)?.methods.get(member)?;
        Some(MethodInfo {
            returns: method.returns.clone(),
            is_static: method.is_static,
            arity: method.params.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "classes": {
            "Object": {},
            "A": { "supertypes": ["Object"] },
            "B": { "supertypes": ["Object"] },
            "Main": {
                "supertypes": ["Object"],
                "fields": { "a": { "type": "A" }, "DEFAULT": { "type": "A", "static": true } },
                "methods": { "make": { "returns": "B", "static": true },
                             "with": { "returns": "B", "static": true, "params": ["int"] } }
            },
            "BtoA": {
                "supertypes": ["Object", "A"],
                "adapter": true,
                "constructors": [["B"], [], ["B", "B"]]
            },
            "Broken": { "supertypes": ["A"], "adapter": true, "constructors": [[]] }
        }
    }"#;

    #[test]
    fn model_answers_from_the_document() {
        let u = Universe::from_json_str(DOC).unwrap();
        assert!(u.has_class("Main"));
        assert!(!u.has_class("Ghost"));
        assert_eq!(u.direct_supertypes("Object"), Some(BTreeSet::new()));
        assert_eq!(
            u.field_type("Main", "DEFAULT"),
            Some(FieldInfo {
                ty: "A".into(),
                is_static: true
            })
        );
        assert!(!u.field_type("Main", "a").unwrap().is_static);
        assert_eq!(u.method_return_type("Main", "with").unwrap().arity, 1);
        assert_eq!(u.method_return_type("Main", "make").unwrap().returns, "B");
        assert_eq!(u.method_return_type("Main", "nope"), None);
    }

    #[test]
    fn adapters_need_a_single_argument_constructor() {
        let u = Universe::from_json_str(DOC).unwrap();
        let h = Hierarchy::new(&u);
        let library = u.adapter_library(&h).unwrap();
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["BtoA"]);
        let btoa = library.get("BtoA").unwrap();
        assert_eq!(btoa.adapts_from, BTreeSet::from(["B".to_string()]));
        assert!(btoa.provides("A"));

        assert_eq!(
            u.adapter_shape_problems(),
            vec!["adapter 'Broken' lacks required constructor shape: no single-argument constructor"]
        );
    }

    #[test]
    fn undeclared_supertype_is_rejected() {
        let err = Universe::from_json_str(r#"{"classes": {"A": {"supertypes": ["Ghost"]}}}"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "class 'A' names undeclared supertype 'Ghost'"
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = Universe::from_json_str(r#"{"classes": {"A": {"fields": {"x": {}}}}}"#)
            .unwrap_err();
        assert!(matches!(err, UniverseError::Json(_)));
        assert!(err.to_string().starts_with("invalid universe document"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Universe::from_path(Path::new("/nonexistent/universe.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/universe.json"));
    }
}
