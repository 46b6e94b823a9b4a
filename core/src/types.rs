use serde::{Deserialize, Serialize};
use std::fmt;

/// Operators that introduce a version comparison
pub const COMPARISON_OPERATORS: [&str; 5] = ["==", ">=", ">", "<=", "<"];

/// Kind of version constraint carried by a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// No constraint at all
    None,
    /// Bracketed extras, e.g. `[cpu]`
    Extras,
    /// Comparison-operator version expression, e.g. `>=1.21.0`
    Comparison,
}

impl ConstraintKind {
    /// Classify a raw constraint string
    pub fn of(constraint: &str) -> Self {
        if constraint.is_empty() {
            ConstraintKind::None
        } else if constraint.contains('[') || constraint.contains(']') {
            ConstraintKind::Extras
        } else {
            ConstraintKind::Comparison
        }
    }

    /// True when the constraint mixes extras with comparison operators
    pub fn is_mixed(constraint: &str) -> bool {
        let has_extras = constraint.contains('[') || constraint.contains(']');
        let has_comparison = COMPARISON_OPERATORS.iter().any(|op| constraint.contains(op));
        has_extras && has_comparison
    }
}

/// One line of the package mini-language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// Package name as passed to the installer (may hold several space-separated names)
    pub name: String,
    /// Empty, extras (`[cpu]`) or comparison (`>=1.21.0`)
    pub version_constraint: String,
    /// Empty, a repository URL / commit reference, or the `current` sentinel
    pub source_locator: String,
    /// Module checked by the import guard; empty disables the guard
    pub import_name: String,
    /// Other modules whose import also requires this package
    pub dependent_import_names: Vec<String>,
    /// Extra installer flags, env references not yet substituted
    pub install_options: String,
    /// Shell fragment run before the installer, env references not yet substituted
    pub pre_install_commands: String,
}

impl PackageDescriptor {
    /// Descriptor with a bare name and every other field defaulted
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            import_name: name.clone(),
            name,
            version_constraint: String::new(),
            source_locator: String::new(),
            dependent_import_names: Vec::new(),
            install_options: String::new(),
            pre_install_commands: String::new(),
        }
    }

    pub fn constraint_kind(&self) -> ConstraintKind {
        ConstraintKind::of(&self.version_constraint)
    }

    /// Import name followed by the dependent imports
    pub fn import_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.import_name.as_str())
            .chain(self.dependent_import_names.iter().map(String::as_str))
    }

    /// Identifier for the generated notebook cell
    pub fn cell_id(&self) -> String {
        format!("{}_install", self.name.replace(' ', "_"))
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.version_constraint)?;
        if !self.source_locator.is_empty() {
            write!(f, "@{}", self.source_locator)?;
        }
        write!(f, "${}", self.import_name)?;
        if !self.dependent_import_names.is_empty() {
            write!(f, "%{}", self.dependent_import_names.join(" "))?;
        }
        if !self.install_options.is_empty() {
            write!(f, "£{}", self.install_options)?;
        }
        if !self.pre_install_commands.is_empty() {
            write!(f, "€{}", self.pre_install_commands)?;
        }
        Ok(())
    }
}

/// The seven parallel columns of a parsed descriptor string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageColumns {
    pub names: Vec<String>,
    pub versions: Vec<String>,
    pub urls: Vec<String>,
    pub imports: Vec<String>,
    pub dependent_imports: Vec<String>,
    pub install_command_line_options: Vec<String>,
    pub extra_commands_before_install: Vec<String>,
}

impl PackageColumns {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<&[PackageDescriptor]> for PackageColumns {
    fn from(descriptors: &[PackageDescriptor]) -> Self {
        let mut columns = PackageColumns::default();
        for descriptor in descriptors {
            columns.names.push(descriptor.name.clone());
            columns.versions.push(descriptor.version_constraint.clone());
            columns.urls.push(descriptor.source_locator.clone());
            columns.imports.push(descriptor.import_name.clone());
            columns
                .dependent_imports
                .push(descriptor.dependent_import_names.join(" "));
            columns
                .install_command_line_options
                .push(descriptor.install_options.clone());
            columns
                .extra_commands_before_install
                .push(descriptor.pre_install_commands.clone());
        }
        columns
    }
}
