//! Definitions of the artifacts a bootstrap run creates: credentials and indexes.

use std::fmt;

use mongodb::bson::{doc, Bson, Document};

/// Built-in MongoDB role granting read and write on one database.
pub const READ_WRITE_ROLE: &str = "readWrite";

/// A role granted on a single database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role: String,
    pub db: String,
}

impl RoleGrant {
    pub fn to_document(&self) -> Document {
        doc! { "role": self.role.as_str(), "db": self.db.as_str() }
    }
}

/// Application credential together with the roles it receives.
#[derive(Clone, PartialEq, Eq)]
pub struct UserGrant {
    pub username: String,
    pub password: String,
    pub roles: Vec<RoleGrant>,
}

impl UserGrant {
    /// Credential holding exactly one `readWrite` grant on `database`.
    pub fn read_write(
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            roles: vec![RoleGrant {
                role: READ_WRITE_ROLE.to_string(),
                db: database.into(),
            }],
        }
    }

    /// `createUser` command body for this credential.
    pub fn create_command(&self) -> Document {
        let roles: Vec<Bson> = self
            .roles
            .iter()
            .map(|grant| Bson::Document(grant.to_document()))
            .collect();

        doc! {
            "createUser": self.username.as_str(),
            "pwd": self.password.as_str(),
            "roles": roles,
        }
    }
}

impl fmt::Debug for UserGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserGrant")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Ordering of a key inside an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDirection {
    Ascending,
    Descending,
    Text,
}

impl IndexDirection {
    fn to_bson(self) -> Bson {
        match self {
            Self::Ascending => Bson::Int32(1),
            Self::Descending => Bson::Int32(-1),
            Self::Text => Bson::String("text".to_string()),
        }
    }

    fn name_suffix(self) -> &'static str {
        match self {
            Self::Ascending => "1",
            Self::Descending => "-1",
            Self::Text => "text",
        }
    }
}

/// A named index over one or more fields, in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: String,
    pub keys: Vec<(String, IndexDirection)>,
}

impl IndexDefinition {
    /// Builds a definition named the way the server names indexes by default,
    /// e.g. `categoria_1_precio_valor_1_fecha_extraccion_-1`.
    pub fn new(keys: &[(&str, IndexDirection)]) -> Self {
        let name = keys
            .iter()
            .map(|(field, direction)| format!("{field}_{}", direction.name_suffix()))
            .collect::<Vec<_>>()
            .join("_");

        Self {
            name,
            keys: keys
                .iter()
                .map(|(field, direction)| ((*field).to_string(), *direction))
                .collect(),
        }
    }

    pub fn ascending(field: &str) -> Self {
        Self::new(&[(field, IndexDirection::Ascending)])
    }

    pub fn descending(field: &str) -> Self {
        Self::new(&[(field, IndexDirection::Descending)])
    }

    /// Full-text index across `fields`.
    pub fn text(fields: &[&str]) -> Self {
        let keys: Vec<(&str, IndexDirection)> = fields
            .iter()
            .map(|field| (*field, IndexDirection::Text))
            .collect();
        Self::new(&keys)
    }

    pub fn is_text(&self) -> bool {
        self.keys
            .iter()
            .any(|(_, direction)| *direction == IndexDirection::Text)
    }

    pub fn is_compound(&self) -> bool {
        self.keys.len() > 1 && !self.is_text()
    }

    /// Key document handed to `createIndexes`; field order is preserved.
    pub fn key_document(&self) -> Document {
        let mut keys = Document::new();
        for (field, direction) in &self.keys {
            keys.insert(field.clone(), direction.to_bson());
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_grant_is_scoped_to_one_database() {
        let grant = UserGrant::read_write("app", "secret", "products");
        assert_eq!(
            grant.roles,
            vec![RoleGrant {
                role: "readWrite".to_string(),
                db: "products".to_string(),
            }]
        );
    }

    #[test]
    fn create_command_carries_roles() {
        let grant = UserGrant::read_write("app", "secret", "products");
        let command = grant.create_command();

        assert_eq!(command.get_str("createUser").unwrap(), "app");
        assert_eq!(command.get_str("pwd").unwrap(), "secret");
        let roles = command.get_array("roles").unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(
            roles[0].as_document().unwrap(),
            &doc! { "role": "readWrite", "db": "products" }
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let grant = UserGrant::read_write("app", "secret", "products");
        let rendered = format!("{grant:?}");
        assert!(rendered.contains("app"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn compound_index_keeps_field_order_and_default_name() {
        let index = IndexDefinition::new(&[
            ("categoria", IndexDirection::Ascending),
            ("precio_valor", IndexDirection::Ascending),
            ("fecha_extraccion", IndexDirection::Descending),
        ]);

        assert_eq!(index.name, "categoria_1_precio_valor_1_fecha_extraccion_-1");
        assert!(index.is_compound());

        let keys: Vec<_> = index
            .key_document()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("categoria".to_string(), Bson::Int32(1)),
                ("precio_valor".to_string(), Bson::Int32(1)),
                ("fecha_extraccion".to_string(), Bson::Int32(-1)),
            ]
        );
    }

    #[test]
    fn text_index_uses_text_keys() {
        let index = IndexDefinition::text(&["titulo", "marca"]);
        assert_eq!(index.name, "titulo_text_marca_text");
        assert!(index.is_text());
        assert!(!index.is_compound());
        assert_eq!(
            index.key_document(),
            doc! { "titulo": "text", "marca": "text" }
        );
    }

    #[test]
    fn descending_index_name() {
        assert_eq!(
            IndexDefinition::descending("fecha_extraccion").name,
            "fecha_extraccion_-1"
        );
    }
}
