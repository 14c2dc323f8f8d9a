//! Request envelope and its typed view.

use serde::{Deserialize, Serialize};

use super::Priority;
use crate::error::CatalogError;

/// Decoded request envelope as it arrives on the wire.
///
/// `params` stays untyped here: the listener only needs `operation` to
/// classify priority. Workers turn it into an [`Operation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Non-string values (`null`, numbers, ...) are kept as their JSON text
    /// so they still reach a worker and get an `unknown operation` reply.
    #[serde(default, deserialize_with = "operation_text")]
    pub operation: String,

    #[serde(default = "empty_params")]
    pub params: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

fn operation_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl Request {
    pub fn insert(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            operation: "insert".to_string(),
            params: serde_json::json!({
                "id": id.into(),
                "nombre": name.into(),
                "precio": price,
            }),
            client_id: None,
        }
    }

    pub fn query(id: impl Into<String>) -> Self {
        Self {
            operation: "query".to_string(),
            params: serde_json::json!({ "id": id.into() }),
            client_id: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Decode one message. Any failure here is a protocol error.
    pub fn decode(bytes: &[u8]) -> Result<Self, CatalogError> {
        serde_json::from_slice(bytes).map_err(CatalogError::Decode)
    }

    pub fn encode(&self) -> Result<Vec<u8>, CatalogError> {
        serde_json::to_vec(self).map_err(CatalogError::Encode)
    }

    pub fn priority(&self) -> Priority {
        Priority::classify(&self.operation)
    }
}

/// Typed operation, resolved by the worker right before execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Insert { id: String, name: String, price: f64 },
    Query { id: String },
}

#[derive(Deserialize)]
struct InsertParams {
    id: String,
    nombre: String,
    precio: f64,
}

#[derive(Deserialize)]
struct QueryParams {
    id: String,
}

impl Operation {
    pub fn from_request(request: &Request) -> Result<Self, CatalogError> {
        match request.operation.as_str() {
            "insert" => {
                let p: InsertParams = decode_params("insert", &request.params)?;
                Ok(Operation::Insert {
                    id: p.id,
                    name: p.nombre,
                    price: p.precio,
                })
            }
            "query" => {
                let p: QueryParams = decode_params("query", &request.params)?;
                Ok(Operation::Query { id: p.id })
            }
            other => Err(CatalogError::UnknownOperation(other.to_string())),
        }
    }
}

fn decode_params<T: serde::de::DeserializeOwned>(
    operation: &'static str,
    params: &serde_json::Value,
) -> Result<T, CatalogError> {
    T::deserialize(params).map_err(|e| CatalogError::InvalidParams {
        operation,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn decodes_wire_insert() {
        let raw = br#"{"operation":"insert","params":{"id":"A","nombre":"Mouse","precio":10.0},"client_id":"c1"}"#;
        let req = Request::decode(raw).unwrap();
        assert_eq!(req.priority(), Priority::High);
        assert_eq!(req.client_id.as_deref(), Some("c1"));

        let op = Operation::from_request(&req).unwrap();
        assert_eq!(
            op,
            Operation::Insert {
                id: "A".into(),
                name: "Mouse".into(),
                price: 10.0
            }
        );
    }

    #[test]
    fn missing_params_default_to_empty_object() {
        let req = Request::decode(br#"{"operation":"query"}"#).unwrap();
        assert!(req.params.is_object());
        assert!(matches!(
            Operation::from_request(&req),
            Err(CatalogError::InvalidParams { operation: "query", .. })
        ));
    }

    #[rstest]
    #[case(&b"not json"[..])]
    #[case(&b""[..])]
    #[case(&b"[1,2,3]"[..])]
    #[case(&b"{\"operation\":"[..])]
    fn undecodable_bytes_are_protocol_errors(#[case] raw: &[u8]) {
        assert!(matches!(Request::decode(raw), Err(CatalogError::Decode(_))));
    }

    #[test]
    fn unknown_operation_is_a_domain_error() {
        let req = Request::decode(br#"{"operation":"delete","params":{"id":"A"}}"#).unwrap();
        assert_eq!(req.priority(), Priority::Low);
        let err = Operation::from_request(&req).unwrap_err();
        assert_eq!(err.to_string(), "unknown operation: delete");
    }

    #[rstest]
    #[case(&br#"{"operation":null,"params":{"id":"A"}}"#[..], "unknown operation: null")]
    #[case(&br#"{"operation":5,"params":{"id":"A"}}"#[..], "unknown operation: 5")]
    #[case(&br#"{"operation":["insert"]}"#[..], r#"unknown operation: ["insert"]"#)]
    fn non_string_operation_decodes_as_unknown(#[case] raw: &[u8], #[case] expected: &str) {
        let req = Request::decode(raw).unwrap();
        assert_eq!(req.priority(), Priority::Low);
        let err = Operation::from_request(&req).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let req = Request::decode(
            br#"{"operation":"insert","params":{"id":"A","nombre":"Mouse","precio":"ten"}}"#,
        )
        .unwrap();
        assert!(matches!(
            Operation::from_request(&req),
            Err(CatalogError::InvalidParams { operation: "insert", .. })
        ));
    }

    #[test]
    fn constructors_match_wire_shape() {
        let req = Request::insert("A", "Mouse", 10.0).with_client_id("c1");
        let bytes = req.encode().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["operation"], "insert");
        assert_eq!(value["params"]["nombre"], "Mouse");
        assert_eq!(value["params"]["precio"], 10.0);
        assert_eq!(value["client_id"], "c1");
    }
}
