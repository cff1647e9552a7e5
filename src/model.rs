use std::fmt;
use std::sync::Arc;

/// Which plain fields a model exposes for selecting and filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedFields {
    /// Every requested field is permitted
    All,
    /// Only the listed fields are permitted. An empty list permits nothing.
    Only(Vec<&'static str>),
}

/// A relation declared on a model.
///
/// The relation is correlated with its owner through a single key pair:
/// `related_table.related_column = parent_table.parent_column`.
/// For a has-many relation this is `foreign key = local key`, for a
/// belongs-to relation `owner key = foreign key`.
#[derive(Clone)]
pub struct RelationDef {
    name: &'static str,
    target: Arc<dyn ApiModel>,
    parent_column: &'static str,
    related_column: &'static str,
}

impl RelationDef {
    /// Declare a relation named `name` pointing at `target`.
    ///
    /// The default correlation is `id` on both sides; use
    /// [`RelationDef::has_many`] or [`RelationDef::belongs_to`] for the common
    /// shapes.
    pub fn new(name: &'static str, target: impl ApiModel + 'static) -> Self {
        Self {
            name,
            target: Arc::new(target),
            parent_column: "id",
            related_column: "id",
        }
    }

    /// `target.foreign_key` references `parent.id`
    pub fn has_many(
        name: &'static str,
        target: impl ApiModel + 'static,
        foreign_key: &'static str,
    ) -> Self {
        Self::new(name, target).keys("id", foreign_key)
    }

    /// `parent.foreign_key` references `target.id`
    pub fn belongs_to(
        name: &'static str,
        target: impl ApiModel + 'static,
        foreign_key: &'static str,
    ) -> Self {
        Self::new(name, target).keys(foreign_key, "id")
    }

    /// Override the correlation key pair
    #[must_use]
    pub const fn keys(mut self, parent_column: &'static str, related_column: &'static str) -> Self {
        self.parent_column = parent_column;
        self.related_column = related_column;
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn target(&self) -> &dyn ApiModel {
        self.target.as_ref()
    }

    #[must_use]
    pub const fn parent_column(&self) -> &'static str {
        self.parent_column
    }

    #[must_use]
    pub const fn related_column(&self) -> &'static str {
        self.related_column
    }
}

impl fmt::Debug for RelationDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationDef")
            .field("name", &self.name)
            .field("target", &self.target.table_name())
            .field("parent_column", &self.parent_column)
            .field("related_column", &self.related_column)
            .finish()
    }
}

/// Capability a data model implements to be queryable from request parameters.
///
/// Only [`ApiModel::table_name`] is required. The allow-list defaults mirror a
/// conservative model: every field may be queried, while no relation, appended
/// attribute or count is exposed until the model lists it.
///
/// # Example
///
/// ```rust
/// use querycrate::{AllowedFields, ApiModel, RelationDef};
///
/// struct Booking;
///
/// impl ApiModel for Booking {
///     fn table_name(&self) -> &str {
///         "bookings"
///     }
/// }
///
/// struct User;
///
/// impl ApiModel for User {
///     fn table_name(&self) -> &str {
///         "users"
///     }
///
///     fn relations(&self) -> Vec<RelationDef> {
///         vec![RelationDef::has_many("bookings", Booking, "user_id")]
///     }
///
///     fn allowed_fields(&self) -> AllowedFields {
///         AllowedFields::Only(vec!["id", "name", "email"])
///     }
///
///     fn allowed_relations(&self) -> Vec<&'static str> {
///         vec!["bookings"]
///     }
/// }
/// ```
pub trait ApiModel: Send + Sync {
    /// Primary table of the model
    fn table_name(&self) -> &str;

    /// Relations declared on the model, keyed by their canonical accessor name
    fn relations(&self) -> Vec<RelationDef> {
        Vec::new()
    }

    /// Look up a relation by canonical name
    fn relation(&self, name: &str) -> Option<RelationDef> {
        self.relations()
            .into_iter()
            .find(|relation| relation.name() == name)
    }

    #[must_use]
    fn allowed_fields(&self) -> AllowedFields {
        AllowedFields::All
    }

    #[must_use]
    fn allowed_relations(&self) -> Vec<&'static str> {
        Vec::new()
    }

    #[must_use]
    fn allowed_appends(&self) -> Vec<&'static str> {
        Vec::new()
    }

    #[must_use]
    fn allowed_counts(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Computed attributes serialized when the request asks for none
    #[must_use]
    fn default_appends(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Requested fields that may be queried, in request order
    fn validated_fields(&self, requested: &[String]) -> Vec<String> {
        match self.allowed_fields() {
            AllowedFields::All => requested.to_vec(),
            AllowedFields::Only(allowed) => intersect(requested, &allowed),
        }
    }

    /// Requested relations that may be loaded or queried, in request order
    fn validated_relations(&self, requested: &[String]) -> Vec<String> {
        intersect(requested, &self.allowed_relations())
    }

    /// Requested appended attributes that may be serialized, in request order
    fn validated_appends(&self, requested: &[String]) -> Vec<String> {
        intersect(requested, &self.allowed_appends())
    }

    /// Requested relation counts that may be computed, in request order
    fn validated_counts(&self, requested: &[String]) -> Vec<String> {
        intersect(requested, &self.allowed_counts())
    }
}

fn intersect(requested: &[String], allowed: &[&'static str]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| allowed.contains(&name.as_str()))
        .cloned()
        .collect()
}

/// Whether a single field survives the model's field allow-list
pub(crate) fn field_allowed(model: &dyn ApiModel, field: &str) -> bool {
    model
        .validated_fields(&[field.to_string()])
        .iter()
        .any(|validated| validated == field)
}

/// Whether a single canonical relation survives the model's relation allow-list
pub(crate) fn relation_allowed(model: &dyn ApiModel, relation: &str) -> bool {
    model
        .validated_relations(&[relation.to_string()])
        .iter()
        .any(|validated| validated == relation)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Open;

    impl ApiModel for Open {
        fn table_name(&self) -> &str {
            "open"
        }
    }

    struct Locked;

    impl ApiModel for Locked {
        fn table_name(&self) -> &str {
            "locked"
        }

        fn relations(&self) -> Vec<RelationDef> {
            vec![RelationDef::has_many("children", Open, "locked_id")]
        }

        fn allowed_fields(&self) -> AllowedFields {
            AllowedFields::Only(vec!["x"])
        }

        fn allowed_relations(&self) -> Vec<&'static str> {
            vec!["children"]
        }

        fn allowed_counts(&self) -> Vec<&'static str> {
            vec!["children"]
        }
    }

    struct Empty;

    impl ApiModel for Empty {
        fn table_name(&self) -> &str {
            "empty"
        }

        fn allowed_fields(&self) -> AllowedFields {
            AllowedFields::Only(vec![])
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_wildcard_fields_pass_everything() {
        assert_eq!(Open.validated_fields(&strings(&["x", "y"])), strings(&["x", "y"]));
    }

    #[test]
    fn test_field_list_intersects() {
        assert_eq!(Locked.validated_fields(&strings(&["x", "y"])), strings(&["x"]));
    }

    #[test]
    fn test_empty_field_list_permits_nothing() {
        assert!(Empty.validated_fields(&strings(&["x"])).is_empty());
    }

    #[test]
    fn test_relations_have_no_wildcard() {
        assert!(Open.validated_relations(&strings(&["anything"])).is_empty());
        assert!(Open.validated_appends(&strings(&["anything"])).is_empty());
        assert!(Open.validated_counts(&strings(&["anything"])).is_empty());
        assert_eq!(
            Locked.validated_relations(&strings(&["children", "parents"])),
            strings(&["children"])
        );
    }

    #[test]
    fn test_request_order_preserved() {
        struct Many;
        impl ApiModel for Many {
            fn table_name(&self) -> &str {
                "many"
            }
            fn allowed_appends(&self) -> Vec<&'static str> {
                vec!["a", "b", "c"]
            }
        }

        assert_eq!(
            Many.validated_appends(&strings(&["c", "a", "z"])),
            strings(&["c", "a"])
        );
    }

    #[test]
    fn test_relation_lookup() {
        let relation = Locked.relation("children").expect("declared relation");
        assert_eq!(relation.target().table_name(), "open");
        assert_eq!(relation.parent_column(), "id");
        assert_eq!(relation.related_column(), "locked_id");
        assert!(Locked.relation("parents").is_none());
    }

    #[test]
    fn test_single_item_helpers() {
        assert!(field_allowed(&Locked, "x"));
        assert!(!field_allowed(&Locked, "y"));
        assert!(relation_allowed(&Locked, "children"));
        assert!(!relation_allowed(&Open, "children"));
    }
}
