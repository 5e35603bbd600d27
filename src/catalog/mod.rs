//! The fixed set of artifacts a bootstrap run provisions.

pub mod models;

use arryn_db::{IndexDefinition, IndexDirection};
use mongodb::bson::DateTime;

pub use models::Archivo;

/// Collection holding raw scraped items; the only one indexed and seeded.
pub const PRIMARY_COLLECTION: &str = "archivos";

/// Every collection the bootstrap creates, in creation order.
pub const COLLECTIONS: [&str; 3] = [PRIMARY_COLLECTION, "productos", "ofertas"];

/// Source identifier shared by the sample documents.
pub const SEED_SOURCE: &str = "store_example";

const SEED_CURRENCY: &str = "USD";

struct SeedRow {
    titulo: &'static str,
    marca: &'static str,
    precio_texto: &'static str,
    precio_valor: f64,
    categoria: &'static str,
    imagen: &'static str,
    link: &'static str,
    detalles_adicionales: &'static str,
}

const SEED_ROWS: [SeedRow; 3] = [
    SeedRow {
        titulo: "iPhone 15 Pro",
        marca: "APPLE",
        precio_texto: "$999",
        precio_valor: 999.0,
        categoria: "electronics",
        imagen: "https://example.com/iphone15.jpg",
        link: "https://example.com/iphone15",
        detalles_adicionales: "Smartphone de alta gama con cámara profesional",
    },
    SeedRow {
        titulo: "MacBook Air M3",
        marca: "APPLE",
        precio_texto: "$1299",
        precio_valor: 1299.0,
        categoria: "electronics",
        imagen: "https://example.com/macbook.jpg",
        link: "https://example.com/macbook",
        detalles_adicionales: "Laptop ultradelgada con chip M3",
    },
    SeedRow {
        titulo: "Nike Air Max 270",
        marca: "NIKE",
        precio_texto: "$150",
        precio_valor: 150.0,
        categoria: "shoes",
        imagen: "https://example.com/airmax.jpg",
        link: "https://example.com/airmax",
        detalles_adicionales: "Zapatillas deportivas con amortiguación Air",
    },
];

/// Indexes on [`PRIMARY_COLLECTION`], in creation order.
pub fn archivo_indexes() -> Vec<IndexDefinition> {
    vec![
        IndexDefinition::ascending("categoria"),
        IndexDefinition::ascending("marca"),
        IndexDefinition::ascending("precio_valor"),
        IndexDefinition::ascending("fuente"),
        IndexDefinition::descending("fecha_extraccion"),
        IndexDefinition::new(&[
            ("categoria", IndexDirection::Ascending),
            ("precio_valor", IndexDirection::Ascending),
            ("fecha_extraccion", IndexDirection::Descending),
        ]),
        IndexDefinition::text(&["titulo", "marca", "categoria"]),
    ]
}

/// Sample catalog items, all stamped with `extracted_at`.
pub fn seed_documents(extracted_at: DateTime) -> Vec<Archivo> {
    SEED_ROWS
        .iter()
        .map(|row| Archivo {
            id: None,
            titulo: row.titulo.to_string(),
            marca: row.marca.to_string(),
            precio_texto: row.precio_texto.to_string(),
            precio_valor: row.precio_valor,
            moneda: SEED_CURRENCY.to_string(),
            categoria: row.categoria.to_string(),
            imagen: row.imagen.to_string(),
            link: row.link.to_string(),
            fuente: SEED_SOURCE.to_string(),
            fecha_extraccion: extracted_at,
            detalles_adicionales: row.detalles_adicionales.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_are_the_three_catalog_containers() {
        assert_eq!(COLLECTIONS, ["archivos", "productos", "ofertas"]);
    }

    #[test]
    fn archivo_index_set_matches_catalog_queries() {
        let names: Vec<String> = archivo_indexes().into_iter().map(|i| i.name).collect();
        assert_eq!(
            names,
            vec![
                "categoria_1",
                "marca_1",
                "precio_valor_1",
                "fuente_1",
                "fecha_extraccion_-1",
                "categoria_1_precio_valor_1_fecha_extraccion_-1",
                "titulo_text_marca_text_categoria_text",
            ]
        );
    }

    #[test]
    fn exactly_one_compound_and_one_text_index() {
        let indexes = archivo_indexes();
        assert_eq!(indexes.iter().filter(|i| i.is_compound()).count(), 1);
        assert_eq!(indexes.iter().filter(|i| i.is_text()).count(), 1);
    }

    #[test]
    fn seed_prices_match_displayed_text() {
        for archivo in seed_documents(DateTime::now()) {
            let displayed: f64 = archivo
                .precio_texto
                .trim_start_matches('$')
                .parse()
                .unwrap();
            assert_eq!(displayed, archivo.precio_valor, "{}", archivo.titulo);
        }
    }

    #[test]
    fn seeds_share_timestamp_source_and_currency() {
        let now = DateTime::now();
        let seeds = seed_documents(now);

        assert_eq!(seeds.len(), 3);
        assert!(seeds.iter().all(|s| s.fecha_extraccion == now));
        assert!(seeds.iter().all(|s| s.fuente == SEED_SOURCE));
        assert!(seeds.iter().all(|s| s.moneda == "USD"));
        assert!(seeds.iter().all(|s| s.id.is_none()));
    }
}
