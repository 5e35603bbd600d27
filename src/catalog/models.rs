use mongodb::bson::{self, oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

/// A scraped catalog item as stored in the `archivos` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archivo {
    /// Server-assigned identifier; absent until inserted
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub titulo: String,
    pub marca: String,
    /// Price as displayed by the source, e.g. `$999`
    pub precio_texto: String,
    /// Numeric price matching `precio_texto`
    pub precio_valor: f64,
    pub moneda: String,
    pub categoria: String,
    pub imagen: String,
    pub link: String,
    /// Identifier of the store the item was scraped from
    pub fuente: String,
    pub fecha_extraccion: DateTime,
    pub detalles_adicionales: String,
}

impl Archivo {
    pub fn to_document(&self) -> Result<Document, bson::ser::Error> {
        bson::to_document(self)
    }
}
