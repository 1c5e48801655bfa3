//! SOAP 1.2 request construction for the `ccgConsGTIN` operation.
//!
//! ```text
//! <soap:Envelope xmlns:soap="…/soap-envelope" xmlns:ccg="…/ccgConsGtin">
//!   <soap:Header/>
//!   <soap:Body>
//!     <ccg:ccgConsGTIN>
//!       <ccg:nfeDadosMsg>
//!         <consGTIN versao="1.00" xmlns="…/nfe"><GTIN>7890142547852</GTIN></consGTIN>
//!       </ccg:nfeDadosMsg>
//!     </ccg:ccgConsGTIN>
//!   </soap:Body>
//! </soap:Envelope>
//! ```

use quick_xml::escape::escape;

/// SOAP 1.2 envelope namespace.
pub const SOAP_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// NF-e schema namespace used by the `consGTIN` payload.
pub const NFE_NS: &str = "http://www.portalfiscal.inf.br/nfe";

/// Web service namespace.
pub const CCG_NS: &str = "http://www.portalfiscal.inf.br/nfe/wsdl/ccgConsGtin";

/// Operation name, also used to label debug captures.
pub const OPERATION: &str = "ccgConsGTIN";

/// SOAP action advertised in the content type.
pub const SOAP_ACTION: &str = "http://www.portalfiscal.inf.br/nfe/wsdl/ccgConsGtin/ccgConsGTIN";

/// Layout version of the `consGTIN` message.
pub const LAYOUT_VERSION: &str = "1.00";

/// The `consGTIN` message carried inside `nfeDadosMsg`.
pub fn request_body(gtin: &str) -> String {
    format!(
        r#"<consGTIN versao="{LAYOUT_VERSION}" xmlns="{NFE_NS}"><GTIN>{}</GTIN></consGTIN>"#,
        escape(gtin)
    )
}

/// Full SOAP envelope for a GTIN query.
pub fn build(gtin: &str) -> String {
    format!(
        concat!(
            r#"<soap:Envelope xmlns:soap="{soap}" xmlns:ccg="{ccg}">"#,
            "<soap:Header/>",
            "<soap:Body>",
            "<ccg:{op}>",
            "<ccg:nfeDadosMsg>{body}</ccg:nfeDadosMsg>",
            "</ccg:{op}>",
            "</soap:Body>",
            "</soap:Envelope>"
        ),
        soap = SOAP_NS,
        ccg = CCG_NS,
        op = OPERATION,
        body = request_body(gtin),
    )
}

/// `Content-Type` header value, carrying the SOAP 1.2 action.
pub fn content_type() -> String {
    format!(r#"application/soap+xml;charset=utf-8;action="{SOAP_ACTION}""#)
}
