//! Parsing and classification of the service's XML responses.
//!
//! Every response is an `<rsp stat="ok|fail">` document. Successful uploads
//! carry a `<document>` element, listings a `<result>` holding any number of
//! `<document>` elements, and failures an `<error>` element with a `message`
//! and, for validation failures, the offending `field`.

use std::collections::HashMap;
use std::fmt;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::document::{ListingEntry, UploadResult};

/// The payload could not be interpreted as a service response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed response: {0}")]
pub struct MalformedResponseError(pub String);

impl MalformedResponseError {
    fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// The `stat` attribute of the root `<rsp>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    Fail,
    Other(String),
}

impl ResponseStatus {
    fn parse(raw: &str) -> Self {
        match raw {
            "ok" => Self::Ok,
            "fail" => Self::Fail,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// A failure response, split by whether it names the rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedError {
    FieldScoped { field: String, message: String },
    Generic { message: String },
}

impl ClassifiedError {
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::FieldScoped { field, .. } => Some(field),
            Self::Generic { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::FieldScoped { message, .. } | Self::Generic { message } => message,
        }
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldScoped { field, message } => write!(f, "{field}:{message}"),
            Self::Generic { message } => f.write_str(message),
        }
    }
}

/// Result of a well-formed response: the success payload or the
/// service's classified failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Ok(T),
    Fail(ClassifiedError),
}

/// Parse the answer to an upload.
pub fn parse_upload(raw: &str) -> Result<Outcome<UploadResult>, MalformedResponseError> {
    let response = Response::parse(raw)?;

    match response.status {
        ResponseStatus::Ok => {}
        ResponseStatus::Fail => return Ok(Outcome::Fail(response.classify()?)),
        ResponseStatus::Other(stat) => {
            return Err(MalformedResponseError::new(format!(
                "unexpected status {stat:?}"
            )));
        }
    }

    let document = response
        .find("document")
        .ok_or_else(|| MalformedResponseError::new("missing <document> element"))?;

    Ok(Outcome::Ok(UploadResult {
        document_id: document.require("documentId")?,
        name: document.require("name")?,
        title: document.require("title")?,
    }))
}

/// Parse a document listing. Entries keep the order the service sent them in.
pub fn parse_listing(raw: &str) -> Result<Outcome<Vec<ListingEntry>>, MalformedResponseError> {
    let response = Response::parse(raw)?;

    match response.status {
        ResponseStatus::Ok => {}
        ResponseStatus::Fail => return Ok(Outcome::Fail(response.classify()?)),
        ResponseStatus::Other(stat) => {
            return Err(MalformedResponseError::new(format!(
                "unexpected status {stat:?}"
            )));
        }
    }

    response
        .elements
        .iter()
        .filter(|el| el.name == "document" && el.is_within("result"))
        .map(|el| {
            Ok(ListingEntry {
                document_id: el.require("documentId")?,
                name: el.attr("name").map(str::to_owned),
                title: el.attr("title").map(str::to_owned),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Outcome::Ok)
}

/// Parse the answer to a delete. Only the root status matters; any detail
/// in a failure is left to the caller to ignore or inspect.
pub fn parse_delete(raw: &str) -> Result<ResponseStatus, MalformedResponseError> {
    Response::parse(raw).map(|response| response.status)
}

/// Whether `raw` is an `<rsp>` document at all, whatever its status.
pub fn is_service_response(raw: &str) -> bool {
    Response::parse(raw).is_ok()
}

/// An element and the names of the elements enclosing it, root first.
#[derive(Debug)]
struct Element {
    name: String,
    ancestors: Vec<String>,
    attributes: HashMap<String, String>,
}

impl Element {
    fn from_start(
        start: &BytesStart<'_>,
        ancestors: &[String],
    ) -> Result<Self, MalformedResponseError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = HashMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| MalformedResponseError::new(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| MalformedResponseError::new(e.to_string()))?
                .into_owned();
            attributes.insert(key, value);
        }

        Ok(Self {
            name,
            ancestors: ancestors.to_vec(),
            attributes,
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn require(&self, key: &str) -> Result<String, MalformedResponseError> {
        self.attr(key).map(str::to_owned).ok_or_else(|| {
            MalformedResponseError::new(format!("<{}> is missing `{key}`", self.name))
        })
    }

    fn is_within(&self, ancestor: &str) -> bool {
        self.ancestors.iter().any(|a| a == ancestor)
    }
}

/// A flattened `<rsp>` document: the root status plus every element below
/// the root in document order.
#[derive(Debug)]
struct Response {
    status: ResponseStatus,
    elements: Vec<Element>,
}

impl Response {
    fn parse(raw: &str) -> Result<Self, MalformedResponseError> {
        let mut reader = Reader::from_str(raw);
        reader.trim_text(true);

        let mut root: Option<Element> = None;
        let mut elements = Vec::new();
        let mut stack: Vec<String> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                MalformedResponseError::new(format!(
                    "XML error at position {}: {e}",
                    reader.buffer_position()
                ))
            })?;

            match event {
                Event::Start(start) => {
                    let element = Element::from_start(&start, &stack)?;
                    stack.push(element.name.clone());
                    Self::place(element, &mut root, &mut elements)?;
                }
                Event::Empty(start) => {
                    let element = Element::from_start(&start, &stack)?;
                    Self::place(element, &mut root, &mut elements)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(MalformedResponseError::new(format!(
                "unclosed <{}> element",
                stack.join("><")
            )));
        }

        let root = root.ok_or_else(|| MalformedResponseError::new("no root element"))?;
        if root.name != "rsp" {
            return Err(MalformedResponseError::new(format!(
                "expected <rsp> root element, found <{}>",
                root.name
            )));
        }

        let status = root
            .attr("stat")
            .map(ResponseStatus::parse)
            .ok_or_else(|| MalformedResponseError::new("<rsp> is missing `stat`"))?;

        Ok(Self { status, elements })
    }

    fn place(
        element: Element,
        root: &mut Option<Element>,
        elements: &mut Vec<Element>,
    ) -> Result<(), MalformedResponseError> {
        if element.ancestors.is_empty() {
            if root.is_some() {
                return Err(MalformedResponseError::new("multiple root elements"));
            }
            *root = Some(element);
        } else {
            elements.push(element);
        }
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|el| el.name == name)
    }

    /// Classify a `fail` response from its first `<error>` element.
    fn classify(&self) -> Result<ClassifiedError, MalformedResponseError> {
        let error = self
            .find("error")
            .ok_or_else(|| MalformedResponseError::new("failure response without <error>"))?;

        let message = error.attr("message").unwrap_or_default().to_owned();

        Ok(match error.attr("field") {
            Some(field) => ClassifiedError::FieldScoped {
                field: field.to_owned(),
                message,
            },
            None => ClassifiedError::Generic { message },
        })
    }
}
