//! # Response Parsing
//!
//! Reads the SOAP answer and maps `retConsGTIN` onto a [`LookupResult`].
//!
//! ```text
//! cStat 9490 ──► success, "Data found.", xProd / NCM / CEST
//! cStat 9496 ──► success, "found but unavailable"
//! other      ──► failure, reason = xMotivo
//! Fault      ──► CcgError::SoapFault
//! ```
//!
//! Elements are matched on their local name so any namespace prefix
//! (`soap:`, `env:`, none) is accepted.

use gtin_core::lookup::{STATUS_FOUND, STATUS_UNAVAILABLE};
use gtin_core::LookupResult;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{CcgError, CcgResult};

/// Fields of a `retConsGTIN` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetConsGtin {
    pub status: String,
    pub reason: Option<String>,
    pub product_description: Option<String>,
    pub ncm: Option<String>,
    pub cest: Option<String>,
}

impl RetConsGtin {
    /// Applies the status mapping.
    pub fn into_result(self) -> LookupResult {
        match self.status.as_str() {
            STATUS_FOUND => LookupResult::found(self.product_description, self.ncm, self.cest),
            STATUS_UNAVAILABLE => LookupResult::unavailable(),
            _ => LookupResult::rejected(self.status, self.reason.unwrap_or_default()),
        }
    }
}

#[derive(Default)]
struct Fault {
    seen: bool,
    code: Option<String>,
    reason: Option<String>,
}

/// Parses a response body into a [`LookupResult`].
pub fn parse(body: &str) -> CcgResult<LookupResult> {
    extract(body).map(RetConsGtin::into_result)
}

/// Parses a response body into its raw `retConsGTIN` fields.
pub fn extract(body: &str) -> CcgResult<RetConsGtin> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut ret: Option<RetConsGtin> = None;
    let mut fault = Fault::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match name.as_str() {
                    "retConsGTIN" if ret.is_none() => ret = Some(RetConsGtin::default()),
                    "Fault" => fault.seen = true,
                    _ => {}
                }
                path.push(name);
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"retConsGTIN" && ret.is_none() {
                    ret = Some(RetConsGtin::default());
                }
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| CcgError::InvalidResponse(err.to_string()))?
                    .into_owned();
                collect(&path, text, ret.as_mut(), &mut fault);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                collect(&path, text, ret.as_mut(), &mut fault);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if fault.seen {
        return Err(CcgError::SoapFault {
            code: fault.code.unwrap_or_default(),
            reason: fault.reason.unwrap_or_default(),
        });
    }

    let ret = ret.ok_or_else(|| CcgError::InvalidResponse("retConsGTIN element not found".into()))?;
    if ret.status.is_empty() {
        return Err(CcgError::InvalidResponse("retConsGTIN without cStat".into()));
    }

    Ok(ret)
}

fn collect(path: &[String], text: String, ret: Option<&mut RetConsGtin>, fault: &mut Fault) {
    let Some(current) = path.last().map(String::as_str) else {
        return;
    };
    let parent = path.len().checked_sub(2).map(|i| path[i].as_str());

    if fault.seen && path.iter().any(|p| p == "Fault") {
        match (parent, current) {
            (Some("Code"), "Value") | (_, "faultcode") if fault.code.is_none() => {
                fault.code = Some(text)
            }
            (Some("Reason"), "Text") | (_, "faultstring") if fault.reason.is_none() => {
                fault.reason = Some(text)
            }
            _ => {}
        }
        return;
    }

    let Some(ret) = ret else {
        return;
    };
    if !path.iter().any(|p| p == "retConsGTIN") {
        return;
    }

    // first occurrence wins
    let slot = match current {
        "cStat" if ret.status.is_empty() => {
            ret.status = text;
            return;
        }
        "xMotivo" => &mut ret.reason,
        "xProd" => &mut ret.product_description,
        "NCM" => &mut ret.ncm,
        "CEST" => &mut ret.cest,
        _ => return,
    };
    if slot.is_none() {
        *slot = Some(text);
    }
}
