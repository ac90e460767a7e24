//! Strict, grammar-based extraction
//!
//! Parses each file with tree-sitter and inspects only module-level function
//! definitions (decorated or not). Shapes the canonical form cannot express
//! are rejected rather than normalised, so an interface change such as a new
//! `*args` is visible instead of being silently flattened.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use terrain_model::Signature;
use tree_sitter::{Node, Parser};

use crate::error::{ExtractError, ParamShape, TerrainIssue};
use crate::source::python_sources;

/// Fail-closed extractor used on the Validator side
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictExtractor;

/// Outcome of inspecting one function definition
enum Definition {
    Public(Signature),
    Rejected(TerrainIssue),
    Skipped,
}

impl StrictExtractor {
    /// Create new strict extractor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract the sorted Terrain truth from every `.py` file under `root`
    ///
    /// # Errors
    /// - [`ExtractError::Io`] if a source file cannot be read
    /// - [`ExtractError::TerrainInvalid`] listing every syntax error,
    ///   unsupported shape, malformed name and duplicate found
    pub fn extract(&self, root: &Path) -> Result<Vec<Signature>, ExtractError> {
        let mut parser = new_parser()?;
        let mut found: Vec<(Signature, PathBuf)> = Vec::new();
        let mut issues = Vec::new();

        for path in python_sources(root) {
            let source =
                std::fs::read_to_string(&path).map_err(|e| ExtractError::io_error(&path, e))?;
            tracing::debug!("strict extractor parsing {}", path.display());

            let (sigs, file_issues) = Self::scan(&mut parser, &path, &source)?;
            found.extend(sigs.into_iter().map(|sig| (sig, path.clone())));
            issues.extend(file_issues);
        }

        let mut by_signature: BTreeMap<Signature, Vec<PathBuf>> = BTreeMap::new();
        for (sig, path) in found {
            by_signature.entry(sig).or_default().push(path);
        }

        issues.extend(
            by_signature
                .iter()
                .filter(|(_, paths)| paths.len() > 1)
                .map(|(sig, paths)| TerrainIssue::Duplicate {
                    signature: sig.canonical().to_string(),
                    paths: paths.clone(),
                }),
        );

        if !issues.is_empty() {
            return Err(ExtractError::TerrainInvalid { issues });
        }

        Ok(by_signature.into_keys().collect())
    }

    /// Extract from a single source text, labelled with `path` for issues
    ///
    /// Duplicates within the text are rejected just as they are across files.
    ///
    /// # Errors
    /// Same as [`StrictExtractor::extract`], minus IO.
    pub fn extract_source(&self, path: &Path, source: &str) -> Result<Vec<Signature>, ExtractError> {
        let mut parser = new_parser()?;
        let (mut sigs, mut issues) = Self::scan(&mut parser, path, source)?;

        sigs.sort();
        for pair in sigs.windows(2) {
            if pair[0] == pair[1] {
                issues.push(TerrainIssue::Duplicate {
                    signature: pair[0].canonical().to_string(),
                    paths: vec![path.to_path_buf(), path.to_path_buf()],
                });
            }
        }
        issues.dedup();

        if issues.is_empty() {
            Ok(sigs)
        } else {
            Err(ExtractError::TerrainInvalid { issues })
        }
    }

    /// Parse one file, returning its public signatures and any issues
    fn scan(
        parser: &mut Parser,
        path: &Path,
        source: &str,
    ) -> Result<(Vec<Signature>, Vec<TerrainIssue>), ExtractError> {
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::ParserInit("parse returned no tree".to_string()))?;
        let root = tree.root_node();

        if root.has_error() {
            let (line, column) = first_error_position(root).unwrap_or((1, 1));
            return Ok((
                Vec::new(),
                vec![TerrainIssue::Syntax {
                    path: path.to_path_buf(),
                    line,
                    column,
                }],
            ));
        }

        let mut sigs = Vec::new();
        let mut issues = Vec::new();
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            let function = match child.kind() {
                "function_definition" => Some(child),
                "decorated_definition" => child
                    .child_by_field_name("definition")
                    .filter(|d| d.kind() == "function_definition"),
                _ => None,
            };

            let Some(function) = function else { continue };
            match inspect_function(function, path, source) {
                Definition::Public(sig) => sigs.push(sig),
                Definition::Rejected(issue) => issues.push(issue),
                Definition::Skipped => {}
            }
        }

        Ok((sigs, issues))
    }
}

fn new_parser() -> Result<Parser, ExtractError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ExtractError::ParserInit(e.to_string()))?;
    Ok(parser)
}

fn inspect_function(function: Node<'_>, path: &Path, source: &str) -> Definition {
    let bytes = source.as_bytes();

    // `async def` is a different statement kind; only plain `def` counts
    let mut cursor = function.walk();
    let is_async = function
        .children(&mut cursor)
        .next()
        .is_some_and(|first| first.kind() == "async");
    if is_async {
        return Definition::Skipped;
    }

    let Some(name) = function
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(bytes).ok())
    else {
        return Definition::Skipped;
    };
    if name.starts_with('_') {
        return Definition::Skipped;
    }

    let params = match function.child_by_field_name("parameters") {
        Some(node) => match parameter_names(node, bytes) {
            Ok(params) => params,
            Err(shape) => {
                return Definition::Rejected(TerrainIssue::Unsupported {
                    path: path.to_path_buf(),
                    function: name.to_string(),
                    shape,
                })
            }
        },
        None => Vec::new(),
    };

    match Signature::new(name, params.iter().copied()) {
        Ok(sig) => Definition::Public(sig),
        Err(_) => Definition::Rejected(TerrainIssue::Malformed {
            path: path.to_path_buf(),
            signature: format!("{}({})", name, params.join(", ")),
        }),
    }
}

/// Bare parameter names, or the first shape that cannot be canonicalised
fn parameter_names<'a>(parameters: Node<'_>, bytes: &'a [u8]) -> Result<Vec<&'a str>, ParamShape> {
    let mut names = Vec::new();
    let mut cursor = parameters.walk();

    for param in parameters.named_children(&mut cursor) {
        let name_node = match param.kind() {
            "identifier" => param,
            "typed_parameter" => {
                let mut inner = param.walk();
                let target = param.named_children(&mut inner).next();
                match target.map(|t| (t.kind(), t)) {
                    Some(("identifier", t)) => t,
                    Some(("list_splat_pattern", _)) => return Err(ParamShape::VarPositional),
                    Some(("dictionary_splat_pattern", _)) => return Err(ParamShape::VarKeyword),
                    Some((kind, _)) => return Err(ParamShape::Other(kind.to_string())),
                    None => return Err(ParamShape::Other("typed_parameter".to_string())),
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                match param.child_by_field_name("name") {
                    Some(n) if n.kind() == "identifier" => n,
                    Some(n) => return Err(ParamShape::Other(n.kind().to_string())),
                    None => return Err(ParamShape::Other(param.kind().to_string())),
                }
            }
            "list_splat_pattern" => return Err(ParamShape::VarPositional),
            "dictionary_splat_pattern" => return Err(ParamShape::VarKeyword),
            "keyword_separator" => return Err(ParamShape::KeywordOnly),
            "positional_separator" => return Err(ParamShape::PositionalOnly),
            "comment" => continue,
            other => return Err(ParamShape::Other(other.to_string())),
        };

        let text = name_node
            .utf8_text(bytes)
            .map_err(|_| ParamShape::Other("non-utf8 identifier".to_string()))?;
        names.push(text);
    }

    Ok(names)
}

/// 1-based position of the first ERROR or MISSING node, depth first
fn first_error_position(node: Node<'_>) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let point = node.start_position();
        return Some((point.row + 1, point.column + 1));
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error_position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Result<Vec<Signature>, ExtractError> {
        StrictExtractor::new().extract_source(Path::new("mod.py"), source)
    }

    fn canon(sigs: &[Signature]) -> Vec<&str> {
        sigs.iter().map(Signature::canonical).collect()
    }

    fn single_issue(source: &str) -> TerrainIssue {
        let err = extract(source).unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 1, "unexpected issues: {issues:?}");
        issues[0].clone()
    }

    #[test]
    fn accepts_annotations_and_defaults_as_bare_names() {
        let src = "\
def normalize_country(country: str) -> str:
    return country.strip().upper()


def calculate_tax(amount: float, country: str, rate: float = 0.1) -> float:
    return amount * rate
";
        let sigs = extract(src).unwrap();
        assert_eq!(
            canon(&sigs),
            vec!["calculate_tax(amount, country, rate)", "normalize_country(country)"]
        );
    }

    #[test]
    fn handles_multiline_and_decorated_definitions() {
        let src = "\
import functools

@functools.lru_cache
def cached(
    key,
    default=None,
):
    return key
";
        let sigs = extract(src).unwrap();
        assert_eq!(canon(&sigs), vec!["cached(key, default)"]);
    }

    #[test]
    fn ignores_private_nested_methods_and_async() {
        let src = "\
def _private(x):
    pass

class Service:
    def method(self, x):
        pass

async def fetch(url):
    pass

def outer(a):
    def inner(b):
        pass
    return inner
";
        assert_eq!(canon(&extract(src).unwrap()), vec!["outer(a)"]);
    }

    #[test]
    fn rejects_var_positional() {
        let issue = single_issue("def f(a, *args):\n    pass\n");
        assert!(matches!(
            issue,
            TerrainIssue::Unsupported { ref function, shape: ParamShape::VarPositional, .. } if function == "f"
        ));
    }

    #[test]
    fn rejects_typed_var_keyword() {
        let issue = single_issue("def f(a, **kwargs: int):\n    pass\n");
        assert!(matches!(
            issue,
            TerrainIssue::Unsupported { shape: ParamShape::VarKeyword, .. }
        ));
    }

    #[test]
    fn rejects_keyword_only() {
        let issue = single_issue("def f(a, *, b):\n    pass\n");
        assert!(matches!(
            issue,
            TerrainIssue::Unsupported { shape: ParamShape::KeywordOnly, .. }
        ));
    }

    #[test]
    fn rejects_positional_only() {
        let issue = single_issue("def f(a, /, b):\n    pass\n");
        assert!(matches!(
            issue,
            TerrainIssue::Unsupported { shape: ParamShape::PositionalOnly, .. }
        ));
    }

    #[test]
    fn private_functions_may_use_any_shape() {
        let src = "def _f(*args, **kwargs):\n    pass\ndef g():\n    pass\n";
        assert_eq!(canon(&extract(src).unwrap()), vec!["g()"]);
    }

    #[test]
    fn rejects_duplicate_definitions() {
        let src = "def f(a):\n    pass\n\ndef f(a):\n    pass\n";
        let issue = single_issue(src);
        assert!(matches!(issue, TerrainIssue::Duplicate { ref signature, .. } if signature == "f(a)"));
    }

    #[test]
    fn same_name_different_params_is_not_duplicate() {
        let src = "def f(a):\n    pass\n\ndef f(a, b):\n    pass\n";
        assert_eq!(canon(&extract(src).unwrap()), vec!["f(a)", "f(a, b)"]);
    }

    #[test]
    fn rejects_non_ascii_names() {
        let issue = single_issue("def café(x):\n    pass\n");
        assert!(matches!(issue, TerrainIssue::Malformed { .. }));
    }

    #[test]
    fn reports_syntax_errors() {
        let issue = single_issue("def broken(a:\n    pass\n");
        assert!(matches!(issue, TerrainIssue::Syntax { .. }));
    }

    #[test]
    fn empty_source_is_empty_terrain() {
        assert!(extract("").unwrap().is_empty());
    }
}
