//! Python bindings for the Circumflang parser.

use circumflang_core::{
    error::{Diagnostic as CoreDiagnostic, DiagnosticKind as CoreDiagnosticKind},
    span::Span as CoreSpan,
    AccessError, Document, Group, ParseResult as CoreParseResult, Parser as CoreParser,
    ValueList,
};
use pyo3::exceptions::{PyIndexError, PyKeyError};
use pyo3::prelude::*;
use pyo3::types::{PyIterator, PyList};

fn access_error(e: AccessError) -> PyErr {
    match e {
        AccessError::OutOfRange { .. } => PyIndexError::new_err(e.to_string()),
        AccessError::KeyNotFound { tag } => PyKeyError::new_err(tag),
    }
}

/// Map a Python index (possibly negative) onto `0..len`, if it lands there.
fn resolve_index(index: isize, len: usize) -> Result<usize, AccessError> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index as usize)
    };
    resolved.filter(|i| *i < len).ok_or(AccessError::OutOfRange {
        index: index.unsigned_abs(),
        len,
    })
}

fn list_iter<'py>(list: Bound<'py, PyList>) -> PyResult<Bound<'py, PyIterator>> {
    list.into_any().try_iter()
}

// ============================================================================
// Span
// ============================================================================

/// Location in the input with line breaks removed (byte offsets).
#[pyclass(frozen, get_all, name = "Span")]
#[derive(Clone)]
pub struct PySpan {
    pub start: u32,
    pub end: u32,
}

#[pymethods]
impl PySpan {
    fn __repr__(&self) -> String {
        format!("Span({}, {})", self.start, self.end)
    }

    #[getter]
    fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl From<CoreSpan> for PySpan {
    fn from(s: CoreSpan) -> Self {
        PySpan {
            start: s.start,
            end: s.end,
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Why a segment was dropped.
#[pyclass(frozen, eq, eq_int, name = "DiagnosticKind")]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PyDiagnosticKind {
    MalformedPair,
    DuplicateTag,
}

impl From<CoreDiagnosticKind> for PyDiagnosticKind {
    fn from(k: CoreDiagnosticKind) -> Self {
        match k {
            CoreDiagnosticKind::MalformedPair => PyDiagnosticKind::MalformedPair,
            CoreDiagnosticKind::DuplicateTag => PyDiagnosticKind::DuplicateTag,
        }
    }
}

/// A dropped segment.
#[pyclass(frozen, get_all, name = "Diagnostic")]
#[derive(Clone)]
pub struct PyDiagnostic {
    pub message: String,
    pub span: PySpan,
    pub kind: PyDiagnosticKind,
}

#[pymethods]
impl PyDiagnostic {
    fn __repr__(&self) -> String {
        format!("Diagnostic({:?}, {:?})", self.message, self.kind)
    }

    fn __str__(&self) -> String {
        format!(
            "{} at bytes {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

impl From<CoreDiagnostic> for PyDiagnostic {
    fn from(d: CoreDiagnostic) -> Self {
        PyDiagnostic {
            message: d.message,
            span: d.span.into(),
            kind: d.kind.into(),
        }
    }
}

// ============================================================================
// ValueList
// ============================================================================

/// The ordered elements of one field.
#[pyclass(frozen, eq, name = "ValueList")]
#[derive(Clone, PartialEq)]
pub struct PyValueList {
    inner: ValueList,
}

#[pymethods]
impl PyValueList {
    #[new]
    fn new(text: &str) -> Self {
        PyValueList {
            inner: ValueList::parse(text),
        }
    }

    /// Build a list from elements, as given.
    #[staticmethod]
    fn of(values: Vec<String>) -> Self {
        PyValueList {
            inner: ValueList::from(values),
        }
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __getitem__(&self, index: isize) -> PyResult<String> {
        let i = resolve_index(index, self.inner.len()).map_err(access_error)?;
        self.inner.at(i).map(str::to_string).map_err(access_error)
    }

    fn __contains__(&self, value: &str) -> bool {
        self.inner.iter().any(|v| v == value)
    }

    fn __iter__<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyIterator>> {
        list_iter(PyList::new(py, self.inner.iter())?)
    }

    fn __repr__(&self) -> String {
        format!("ValueList({:?})", self.inner.as_slice())
    }

    fn to_list(&self) -> Vec<String> {
        self.inner.as_slice().to_vec()
    }
}

// ============================================================================
// Group
// ============================================================================

/// One record: tagged value lists in insertion order.
#[pyclass(frozen, name = "Group")]
#[derive(Clone)]
pub struct PyGroup {
    inner: Group,
}

#[pymethods]
impl PyGroup {
    #[new]
    fn new(text: &str) -> Self {
        PyGroup {
            inner: Group::parse(text),
        }
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// Raises KeyError when the tag is absent.
    fn __getitem__(&self, tag: &str) -> PyResult<PyValueList> {
        self.value_for(tag)
    }

    fn __contains__(&self, tag: &str) -> bool {
        self.inner.contains_tag(tag)
    }

    /// Iterate over `(tag, ValueList)` tuples.
    fn __iter__<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyIterator>> {
        let pairs = self.inner.iter().map(|pair| {
            (
                pair.tag().to_string(),
                PyValueList {
                    inner: pair.value().clone(),
                },
            )
        });
        list_iter(PyList::new(py, pairs)?)
    }

    fn __repr__(&self) -> String {
        format!("Group(tags={:?})", self.tags())
    }

    fn tags(&self) -> Vec<String> {
        self.inner.tags().map(str::to_string).collect()
    }

    fn values(&self) -> Vec<PyValueList> {
        self.inner
            .values()
            .map(|v| PyValueList { inner: v.clone() })
            .collect()
    }

    #[pyo3(text_signature = "(self, tag)")]
    fn value_for(&self, tag: &str) -> PyResult<PyValueList> {
        self.inner
            .value_for(tag)
            .map(|v| PyValueList { inner: v.clone() })
            .map_err(access_error)
    }

    #[pyo3(text_signature = "(self, tag)")]
    fn contains_tag(&self, tag: &str) -> bool {
        self.inner.contains_tag(tag)
    }

    #[pyo3(text_signature = "(self, value)")]
    fn contains_value(&self, value: &PyValueList) -> bool {
        self.inner.contains_value(&value.inner)
    }
}

// ============================================================================
// Document
// ============================================================================

/// A parsed Circumflang document.
#[pyclass(frozen, name = "Document")]
pub struct PyDocument {
    inner: Document,
}

#[pymethods]
impl PyDocument {
    #[new]
    fn new(text: &str) -> Self {
        PyDocument {
            inner: Document::parse(text),
        }
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __getitem__(&self, index: isize) -> PyResult<PyGroup> {
        let i = resolve_index(index, self.inner.len()).map_err(access_error)?;
        self.inner
            .at(i)
            .map(|g| PyGroup { inner: g.clone() })
            .map_err(access_error)
    }

    fn __iter__<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyIterator>> {
        let groups = self.inner.iter().map(|g| PyGroup { inner: g.clone() });
        list_iter(PyList::new(py, groups)?)
    }

    fn __repr__(&self) -> String {
        format!(
            "Document(groups={}, pairs={})",
            self.inner.len(),
            self.inner.pairs_count()
        )
    }
}

// ============================================================================
// ParseResult
// ============================================================================

/// Result of parsing with diagnostics.
#[pyclass(frozen, name = "ParseResult")]
pub struct PyParseResult {
    #[pyo3(get)]
    pub document: Py<PyDocument>,
    #[pyo3(get)]
    pub diagnostics: Vec<PyDiagnostic>,
}

#[pymethods]
impl PyParseResult {
    #[getter]
    fn ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn __repr__(&self) -> String {
        format!(
            "ParseResult(groups={}, diagnostics={})",
            self.document.get().inner.len(),
            self.diagnostics.len()
        )
    }
}

// ============================================================================
// Module functions
// ============================================================================

/// Parse a Circumflang string. Dropped segments are ignored.
///
/// Args:
///     text: Document string to parse
///
/// Returns:
///     Document: Parsed document
#[pyfunction]
#[pyo3(text_signature = "(text)")]
fn parse(text: &str) -> PyDocument {
    PyDocument::new(text)
}

/// Parse and report every dropped segment.
///
/// Args:
///     text: Document string
///
/// Returns:
///     ParseResult: Result with document and diagnostics
#[pyfunction]
#[pyo3(text_signature = "(text)")]
fn parse_with_recovery(py: Python<'_>, text: &str) -> PyResult<PyParseResult> {
    let CoreParseResult {
        document,
        diagnostics,
    } = CoreParser::new().parse_with_recovery(text);
    Ok(PyParseResult {
        document: Py::new(py, PyDocument { inner: document })?,
        diagnostics: diagnostics.into_iter().map(PyDiagnostic::from).collect(),
    })
}

// ============================================================================
// Module
// ============================================================================

/// Circumflang - parser for caret-delimited record text.
#[pymodule]
fn pycf(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySpan>()?;
    m.add_class::<PyDiagnosticKind>()?;
    m.add_class::<PyDiagnostic>()?;
    m.add_class::<PyValueList>()?;
    m.add_class::<PyGroup>()?;
    m.add_class::<PyDocument>()?;
    m.add_class::<PyParseResult>()?;
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(parse_with_recovery, m)?)?;
    Ok(())
}
