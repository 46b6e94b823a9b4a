//! Parser for the package mini-language.
//!
//! One descriptor per line, with fields separated by reserved characters and
//! split off from the right in a fixed order:
//!
//! ```text
//! name_and_version@locator$import%dependent imports£install options€pre-install commands
//! ```
//!
//! `name_and_version` is then divided at the first version operator
//! (`==`, `>=`, `>`, `<=`, `<`) or extras bracket (`[`).

use crate::error::DescriptorError;
use crate::types::{ConstraintKind, PackageColumns, PackageDescriptor};
use tracing::debug;

/// Separates pre-install shell commands
pub const PRE_INSTALL_DELIMITER: char = '€';
/// Separates installer command line options
pub const OPTIONS_DELIMITER: char = '£';
/// Separates dependent import names
pub const DEPENDENT_IMPORTS_DELIMITER: char = '%';
/// Separates the explicit import name
pub const IMPORT_DELIMITER: char = '$';
/// Separates the source locator
pub const LOCATOR_DELIMITER: char = '@';

/// Scanned in this order; the name shrinks at every match
const VERSION_OPERATORS: [&str; 6] = ["==", ">=", ">", "<=", "<", "["];

/// Parse a newline separated descriptor string.
///
/// The empty string (and a string of blank lines) yields no descriptors.
pub fn parse_packages(input: &str) -> Result<Vec<PackageDescriptor>, DescriptorError> {
    input
        .trim_matches('\n')
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_descriptor(line, idx + 1))
        .collect()
}

/// Parse a descriptor string into seven parallel columns
pub fn packages_str_to_columns(input: &str) -> Result<PackageColumns, DescriptorError> {
    let descriptors = parse_packages(input)?;
    Ok(PackageColumns::from(descriptors.as_slice()))
}

/// Parse a single descriptor line (`line_number` is 1-indexed, for error messages)
pub fn parse_descriptor(line: &str, line_number: usize) -> Result<PackageDescriptor, DescriptorError> {
    let (rest, pre_install_commands) =
        split_once_at_most(line, PRE_INSTALL_DELIMITER, "pre-install commands", line_number)?;
    let (rest, install_options) =
        split_once_at_most(rest, OPTIONS_DELIMITER, "install options", line_number)?;
    let (rest, dependent_imports) = split_once_at_most(
        rest,
        DEPENDENT_IMPORTS_DELIMITER,
        "dependent imports",
        line_number,
    )?;
    let (rest, import_name) = split_once_at_most(rest, IMPORT_DELIMITER, "import name", line_number)?;
    let (name_and_version, source_locator) = split_locator(rest, line_number)?;
    let (name, version_constraint) = split_name_version(name_and_version, line_number)?;

    if name.trim().is_empty() {
        return Err(DescriptorError::EmptyName {
            line: line_number,
            text: line.to_string(),
        });
    }

    if ConstraintKind::is_mixed(version_constraint) {
        return Err(DescriptorError::MixedConstraint {
            line: line_number,
            constraint: version_constraint.to_string(),
        });
    }

    let descriptor = PackageDescriptor {
        name: name.to_string(),
        version_constraint: version_constraint.to_string(),
        source_locator: source_locator.unwrap_or_default().to_string(),
        // An explicit empty import name is kept: it disables the import guard
        import_name: import_name.unwrap_or(name).to_string(),
        dependent_import_names: dependent_imports
            .map(|imports| imports.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
        install_options: install_options.unwrap_or_default().to_string(),
        pre_install_commands: pre_install_commands.unwrap_or_default().to_string(),
    };
    debug!(line = line_number, descriptor = %descriptor, "parsed package descriptor");
    Ok(descriptor)
}

/// Split at a delimiter that may occur at most once.
/// Returns the left part and, if the delimiter was present, the right part.
fn split_once_at_most<'a>(
    text: &'a str,
    delimiter: char,
    field: &'static str,
    line_number: usize,
) -> Result<(&'a str, Option<&'a str>), DescriptorError> {
    let found = text.matches(delimiter).count();
    if found > 1 {
        return Err(DescriptorError::TooManyDelimiters {
            line: line_number,
            delimiter,
            field,
            found,
            max: 1,
            text: text.to_string(),
        });
    }
    Ok(match text.split_once(delimiter) {
        Some((left, right)) => (left, Some(right)),
        None => (text, None),
    })
}

/// The locator may itself hold one `@` (e.g. `repo.git@v1.22.0`), so the
/// first occurrence is the separator and the rest stays in the locator.
fn split_locator(
    text: &str,
    line_number: usize,
) -> Result<(&str, Option<&str>), DescriptorError> {
    let found = text.matches(LOCATOR_DELIMITER).count();
    if found > 2 {
        return Err(DescriptorError::TooManyDelimiters {
            line: line_number,
            delimiter: LOCATOR_DELIMITER,
            field: "source locator",
            found,
            max: 2,
            text: text.to_string(),
        });
    }
    Ok(match text.split_once(LOCATOR_DELIMITER) {
        Some((left, right)) => (left, Some(right)),
        None => (text, None),
    })
}

/// Split `name_and_version` into the package name and the constraint.
/// Repeated operators are only an error within `name_and_version`.
fn split_name_version(
    name_and_version: &str,
    line_number: usize,
) -> Result<(&str, &str), DescriptorError> {
    let mut name = name_and_version;
    for operator in VERSION_OPERATORS {
        if let Some(idx) = name.find(operator) {
            if name_and_version.matches(operator).count() > 1 {
                return Err(DescriptorError::AmbiguousOperator {
                    line: line_number,
                    operator,
                    text: name_and_version.to_string(),
                });
            }
            name = &name[..idx];
        }
    }
    Ok((name, &name_and_version[name.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &str) -> PackageDescriptor {
        let mut descriptors = parse_packages(input).unwrap();
        assert_eq!(descriptors.len(), 1);
        descriptors.remove(0)
    }

    #[test]
    fn test_empty_string() {
        assert!(parse_packages("").unwrap().is_empty());
        let columns = packages_str_to_columns("").unwrap();
        assert!(columns.is_empty());
        assert!(columns.versions.is_empty());
        assert!(columns.extra_commands_before_install.is_empty());
    }

    #[test]
    fn test_only_name() {
        let descriptor = single("numpy");
        assert_eq!(descriptor.name, "numpy");
        assert_eq!(descriptor.version_constraint, "");
        assert_eq!(descriptor.source_locator, "");
        assert_eq!(descriptor.import_name, "numpy");
        assert!(descriptor.dependent_import_names.is_empty());
        assert_eq!(descriptor.install_options, "");
        assert_eq!(descriptor.pre_install_commands, "");
    }

    #[test]
    fn test_minimum_version() {
        let descriptor = single("numpy>=1.21.0");
        assert_eq!(descriptor.name, "numpy");
        assert_eq!(descriptor.version_constraint, ">=1.21.0");
        assert_eq!(descriptor.import_name, "numpy");
    }

    #[test]
    fn test_minimum_maximum_version() {
        let descriptor = single("numpy>=1.21.0,<1.22.0");
        assert_eq!(descriptor.name, "numpy");
        assert_eq!(descriptor.version_constraint, ">=1.21.0,<1.22.0");
    }

    #[test]
    fn test_pinned_version() {
        let descriptor = single("firedrake==real");
        assert_eq!(descriptor.name, "firedrake");
        assert_eq!(descriptor.version_constraint, "==real");
        assert_eq!(descriptor.constraint_kind(), ConstraintKind::Comparison);
    }

    #[test]
    fn test_extras() {
        let descriptor = single("jax[cpu]");
        assert_eq!(descriptor.name, "jax");
        assert_eq!(descriptor.version_constraint, "[cpu]");
        assert_eq!(descriptor.constraint_kind(), ConstraintKind::Extras);
    }

    #[test]
    fn test_url() {
        let descriptor = single("numpy@https://github.com/numpy/numpy.git");
        assert_eq!(descriptor.name, "numpy");
        assert_eq!(descriptor.source_locator, "https://github.com/numpy/numpy.git");
        assert_eq!(descriptor.import_name, "numpy");
    }

    #[test]
    fn test_url_with_tag() {
        let descriptor = single("numpy@https://github.com/numpy/numpy.git@v1.22.0");
        assert_eq!(descriptor.name, "numpy");
        assert_eq!(descriptor.version_constraint, "");
        assert_eq!(
            descriptor.source_locator,
            "https://github.com/numpy/numpy.git@v1.22.0"
        );
    }

    #[test]
    fn test_extras_and_current_url() {
        let descriptor = single("viskex[backend_pyvista]@https://github.com/viskex/viskex.git@current");
        assert_eq!(descriptor.name, "viskex");
        assert_eq!(descriptor.version_constraint, "[backend_pyvista]");
        assert_eq!(
            descriptor.source_locator,
            "https://github.com/viskex/viskex.git@current"
        );
    }

    #[test]
    fn test_import_name() {
        let descriptor = single("python-dateutil$dateutil");
        assert_eq!(descriptor.name, "python-dateutil");
        assert_eq!(descriptor.import_name, "dateutil");
    }

    #[test]
    fn test_url_and_import_name() {
        let descriptor = single("python-dateutil@https://github.com/dateutil/dateutil.git$dateutil");
        assert_eq!(descriptor.name, "python-dateutil");
        assert_eq!(
            descriptor.source_locator,
            "https://github.com/dateutil/dateutil.git"
        );
        assert_eq!(descriptor.import_name, "dateutil");
    }

    #[test]
    fn test_empty_import_name_is_kept() {
        let descriptor = single("numpy>=1.21.0$");
        assert_eq!(descriptor.name, "numpy");
        assert_eq!(descriptor.import_name, "");
    }

    #[test]
    fn test_dependent_imports() {
        let descriptor = single("gmsh$gmsh%pyvista trame");
        assert_eq!(descriptor.import_name, "gmsh");
        assert_eq!(descriptor.dependent_import_names, vec!["pyvista", "trame"]);

        let descriptor = single("vtk%pyvista");
        assert_eq!(descriptor.import_name, "vtk");
        assert_eq!(descriptor.dependent_import_names, vec!["pyvista"]);
    }

    #[test]
    fn test_install_options_and_pre_install_commands() {
        let descriptor = single(
            "mpi4py$mpi4py£--no-binary=mpi4py€export MPICC=${MPI_HOME}/bin/mpicc",
        );
        assert_eq!(descriptor.name, "mpi4py");
        assert_eq!(descriptor.import_name, "mpi4py");
        assert_eq!(descriptor.install_options, "--no-binary=mpi4py");
        assert_eq!(
            descriptor.pre_install_commands,
            "export MPICC=${MPI_HOME}/bin/mpicc"
        );
    }

    #[test]
    fn test_pre_install_commands_may_hold_operators() {
        let descriptor = single("h5py€echo ok > /tmp/log");
        assert_eq!(descriptor.name, "h5py");
        assert_eq!(descriptor.version_constraint, "");
        assert_eq!(descriptor.pre_install_commands, "echo ok > /tmp/log");
    }

    #[test]
    fn test_operator_repeated_outside_name_and_version() {
        let descriptor = single("numpy>=1.0£--opt>=x€test 2 >= 1");
        assert_eq!(descriptor.name, "numpy");
        assert_eq!(descriptor.version_constraint, ">=1.0");
        assert_eq!(descriptor.install_options, "--opt>=x");
        assert_eq!(descriptor.pre_install_commands, "test 2 >= 1");
    }

    #[test]
    fn test_multiple_packages_on_single_line() {
        let descriptor = single("itkwidgets pyvista$pyvista");
        assert_eq!(descriptor.name, "itkwidgets pyvista");
        assert_eq!(descriptor.import_name, "pyvista");
    }

    #[test]
    fn test_multiple_lines() {
        let descriptors = parse_packages("numpy\nscipy\n").unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "numpy");
        assert_eq!(descriptors[1].name, "scipy");
        assert_eq!(descriptors[1].import_name, "scipy");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let columns = packages_str_to_columns("\nnumpy\n\n  \nscipy>=1.0\n").unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns.names, vec!["numpy", "scipy"]);
        assert_eq!(columns.versions, vec!["", ">=1.0"]);
        assert_eq!(columns.imports.len(), 2);
        assert_eq!(columns.urls.len(), 2);
        assert_eq!(columns.dependent_imports.len(), 2);
        assert_eq!(columns.install_command_line_options.len(), 2);
        assert_eq!(columns.extra_commands_before_install.len(), 2);
    }

    #[test]
    fn test_too_many_pre_install_delimiters() {
        let err = parse_packages("numpy€a€b").unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::TooManyDelimiters {
                delimiter: '€',
                found: 2,
                max: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_too_many_option_delimiters() {
        let err = parse_packages("numpy£a£b").unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::TooManyDelimiters { delimiter: '£', .. }
        ));
    }

    #[test]
    fn test_too_many_dependent_import_delimiters() {
        let err = parse_packages("numpy%a%b").unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::TooManyDelimiters { delimiter: '%', .. }
        ));
    }

    #[test]
    fn test_too_many_import_delimiters() {
        let err = parse_packages("numpy\npython-dateutil$a$b").unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::TooManyDelimiters {
                line: 2,
                delimiter: '$',
                ..
            }
        ));
    }

    #[test]
    fn test_too_many_locator_delimiters() {
        let err = parse_packages("numpy@a@b@c").unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::TooManyDelimiters {
                delimiter: '@',
                found: 3,
                max: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_repeated_operator() {
        let err = parse_packages("numpy>=1.0,>=2.0").unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::AmbiguousOperator { operator: ">=", .. }
        ));
    }

    #[test]
    fn test_mixed_constraint() {
        let err = parse_packages("jax[cpu]>=0.4").unwrap_err();
        assert!(matches!(err, DescriptorError::MixedConstraint { .. }));
    }

    #[test]
    fn test_empty_name() {
        let err = parse_packages(">=1.0").unwrap_err();
        assert!(matches!(err, DescriptorError::EmptyName { line: 1, .. }));
    }

    #[test]
    fn test_display_reparses_to_same_descriptor() {
        for input in [
            "numpy",
            "numpy>=1.21.0,<1.22.0",
            "jax[cpu]",
            "numpy@https://github.com/numpy/numpy.git@v1.22.0",
            "python-dateutil@https://github.com/dateutil/dateutil.git$dateutil",
            "itkwidgets pyvista$pyvista%itkwidgets",
            "numpy>=1.21.0$",
            "mpi4py£--no-binary=mpi4py€export CC=$MPICC",
        ] {
            let descriptor = single(input);
            let reparsed = single(&descriptor.to_string());
            assert_eq!(descriptor, reparsed, "round trip of {input}");
        }
    }
}
