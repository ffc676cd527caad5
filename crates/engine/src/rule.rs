//! The module contains `Rule` struct and its persistence model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A budget rule as authored for a season.
///
/// `rule_statement` is a single comparison written with shorthand tier
/// variables, e.g. `l1.totalAmountSpent + l2.totalAmountSpent <= 100`.
/// `notation_map` says how the shorthand expands (`"l" -> "playerLevels.l"`)
/// and `map_names` lists the roots whose first segment is a map key.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub id: Uuid,
    pub season_id: Uuid,
    /// Tag selecting where the rule applies, e.g. `next_bid_budget`.
    pub context: String,
    pub rule_category: Option<String>,
    pub rule_name: Option<String>,
    pub rule_statement: String,
    pub notation_map: BTreeMap<String, String>,
    pub map_names: Vec<String>,
    pub is_active: bool,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(season_id: Uuid, context: &str, rule_statement: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            season_id,
            context: context.to_string(),
            rule_category: None,
            rule_name: None,
            rule_statement: rule_statement.to_string(),
            notation_map: BTreeMap::new(),
            map_names: Vec::new(),
            is_active: true,
            priority: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_notation(mut self, pattern: &str, replacement: &str) -> Self {
        self.notation_map
            .insert(pattern.to_string(), replacement.to_string());
        self
    }

    pub fn with_map_name(mut self, map_name: &str) -> Self {
        self.map_names.push(map_name.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.rule_category = Some(category.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.rule_name = Some(name.to_string());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub season_id: Uuid,
    pub context: String,
    pub rule_category: Option<String>,
    pub rule_name: Option<String>,
    pub rule_statement: String,
    /// JSON object, pattern -> replacement.
    pub notation_map: Option<String>,
    /// JSON array of map root names.
    pub map_names: Option<String>,
    pub is_active: bool,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seasons::Entity",
        from = "Column::SeasonId",
        to = "super::seasons::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Season,
}

impl Related<super::seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Season.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Rule {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let notation_map = decode_json(model.notation_map.as_deref(), "notation_map", model.id)?;
        let map_names = decode_json(model.map_names.as_deref(), "map_names", model.id)?;
        Ok(Self {
            id: model.id,
            season_id: model.season_id,
            context: model.context,
            rule_category: model.rule_category,
            rule_name: model.rule_name,
            rule_statement: model.rule_statement,
            notation_map,
            map_names,
            is_active: model.is_active,
            priority: model.priority,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<&Rule> for ActiveModel {
    type Error = EngineError;

    fn try_from(value: &Rule) -> ResultEngine<Self> {
        let notation_map = if value.notation_map.is_empty() {
            None
        } else {
            Some(encode_json(&value.notation_map)?)
        };
        let map_names = if value.map_names.is_empty() {
            None
        } else {
            Some(encode_json(&value.map_names)?)
        };
        Ok(Self {
            id: ActiveValue::Set(value.id),
            season_id: ActiveValue::Set(value.season_id),
            context: ActiveValue::Set(value.context.clone()),
            rule_category: ActiveValue::Set(value.rule_category.clone()),
            rule_name: ActiveValue::Set(value.rule_name.clone()),
            rule_statement: ActiveValue::Set(value.rule_statement.clone()),
            notation_map: ActiveValue::Set(notation_map),
            map_names: ActiveValue::Set(map_names),
            is_active: ActiveValue::Set(value.is_active),
            priority: ActiveValue::Set(value.priority),
            created_at: ActiveValue::Set(value.created_at),
        })
    }
}

/// Blank or missing columns decode to the empty value.
fn decode_json<T>(raw: Option<&str>, column: &str, rule_id: Uuid) -> ResultEngine<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(T::default()),
        Some(text) => serde_json::from_str(text).map_err(|err| {
            EngineError::MalformedRule(format!("rule {rule_id}: invalid {column}: {err}"))
        }),
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> ResultEngine<String> {
    serde_json::to_string(value).map_err(|err| EngineError::InvalidInput(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(notation_map: Option<&str>, map_names: Option<&str>) -> Model {
        Model {
            id: Uuid::nil(),
            season_id: Uuid::nil(),
            context: "next_bid_budget".to_string(),
            rule_category: None,
            rule_name: Some("level cap".to_string()),
            rule_statement: "l1.totalAmountSpent <= 100".to_string(),
            notation_map: notation_map.map(str::to_string),
            map_names: map_names.map(str::to_string),
            is_active: true,
            priority: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn decodes_json_columns() {
        let rule = Rule::try_from(model(
            Some(r#"{"l":"playerLevels.l"}"#),
            Some(r#"["playerLevels"]"#),
        ))
        .unwrap();
        assert_eq!(rule.notation_map.get("l").unwrap(), "playerLevels.l");
        assert_eq!(rule.map_names, vec!["playerLevels".to_string()]);
    }

    #[test]
    fn missing_json_columns_are_empty() {
        let rule = Rule::try_from(model(None, Some("  "))).unwrap();
        assert!(rule.notation_map.is_empty());
        assert!(rule.map_names.is_empty());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = Rule::try_from(model(Some("{l:"), None)).unwrap_err();
        assert!(matches!(err, EngineError::MalformedRule(_)));
    }

    #[test]
    fn empty_collections_are_stored_as_null() {
        let rule = Rule::new(Uuid::nil(), "next_bid_budget", "team.totalPlayer <= 11");
        let active = ActiveModel::try_from(&rule).unwrap();
        assert!(matches!(active.notation_map, ActiveValue::Set(None)));
        assert!(matches!(active.map_names, ActiveValue::Set(None)));
    }
}
