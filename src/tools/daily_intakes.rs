//! Daily Intake MCP Tools
//!
//! Tools for logging consumed ingredients and recipes.

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use super::{id_string, parse_id, DeleteResponse};
use crate::db::{daily_intakes, Database};
use crate::models::{DailyIntake, Nutrition, ResolvedEntry};

/// An entry as submitted by a client
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct EntryInput {
    /// Id of an ingredient or a recipe
    pub entity_id: String,
    pub amount: i32,
}

/// Entry joined with the ingredient or recipe it references
#[derive(Debug, Serialize)]
pub struct EntryDetail {
    pub entity_id: String,
    pub name: String,
    pub is_recipe: bool,
    pub amount: i32,
    pub sort_order: i32,
    /// Per 100 g for an ingredient, whole-recipe totals for a recipe
    pub nutrition: Nutrition,
}

impl From<&ResolvedEntry> for EntryDetail {
    fn from(entry: &ResolvedEntry) -> Self {
        Self {
            entity_id: entry.entity_id.to_string(),
            name: entry.name().to_string(),
            is_recipe: entry.is_recipe(),
            amount: entry.amount,
            sort_order: entry.sort_order,
            nutrition: entry.nutrition(),
        }
    }
}

/// Daily intake with resolved entries
#[derive(Debug, Serialize)]
pub struct DailyIntakeDetail {
    pub id: Option<String>,
    pub name: String,
    pub entries: Vec<EntryDetail>,
}

impl DailyIntakeDetail {
    fn new(intake: &DailyIntake, resolved: &[ResolvedEntry]) -> Self {
        Self {
            id: id_string(intake.id()),
            name: intake.name().to_string(),
            entries: resolved.iter().map(EntryDetail::from).collect(),
        }
    }
}

/// Summary of a daily intake for list results
#[derive(Debug, Serialize)]
pub struct DailyIntakeSummary {
    pub id: Option<String>,
    pub name: String,
    pub entry_count: usize,
}

impl From<&DailyIntake> for DailyIntakeSummary {
    fn from(intake: &DailyIntake) -> Self {
        Self {
            id: id_string(intake.id()),
            name: intake.name().to_string(),
            entry_count: intake.entries().len(),
        }
    }
}

/// Response for list_daily_intakes
#[derive(Debug, Serialize)]
pub struct ListDailyIntakesResponse {
    pub items: Vec<DailyIntakeSummary>,
    pub total: usize,
}

/// Response for add_daily_intake_entry
#[derive(Debug, Serialize)]
pub struct AddEntryResponse {
    pub added: bool,
    pub message: Option<String>,
    pub intake: DailyIntakeSummary,
}

fn load_detail(db: &Database, id: uuid::Uuid) -> Result<Option<DailyIntakeDetail>, String> {
    let resolved = db
        .with_conn(|conn| daily_intakes::resolve(conn, id))
        .map_err(|e| format!("Failed to get daily intake: {}", e))?;
    Ok(resolved.map(|(intake, entries)| DailyIntakeDetail::new(&intake, &entries)))
}

/// Create a daily intake, optionally with entries
pub fn create_daily_intake(db: &Database, name: &str, entries: &[EntryInput]) -> Result<DailyIntakeDetail, String> {
    let mut intake = DailyIntake::new(name).map_err(|e| e.to_string())?;
    for (index, entry) in entries.iter().enumerate() {
        let entity_id = parse_id(&entry.entity_id, "entity")?;
        if !intake.add_entry(entity_id, entry.amount) {
            return Err(format!(
                "Entry {}: amount must be greater than zero, got {}",
                index + 1,
                entry.amount
            ));
        }
    }

    let saved = db
        .with_conn_mut(|conn| daily_intakes::insert(conn, &intake))
        .map_err(|e| format!("Failed to create daily intake: {}", e))?;

    let id = saved.id().uuid().ok_or("Daily intake was not assigned an id")?;
    load_detail(db, id)?.ok_or_else(|| format!("Daily intake not found with id: {}", id))
}

/// Get a daily intake with each entry resolved to its ingredient or recipe
pub fn get_daily_intake(db: &Database, id: &str) -> Result<Option<DailyIntakeDetail>, String> {
    let id = parse_id(id, "daily intake")?;
    load_detail(db, id)
}

pub fn list_daily_intakes(db: &Database) -> Result<ListDailyIntakesResponse, String> {
    let items = db
        .with_conn(daily_intakes::list)
        .map_err(|e| format!("Failed to list daily intakes: {}", e))?;

    let items: Vec<DailyIntakeSummary> = items.iter().map(DailyIntakeSummary::from).collect();
    let total = items.len();
    Ok(ListDailyIntakesResponse { items, total })
}

/// Append an entry. Non-positive amounts are not logged.
pub fn add_daily_intake_entry(
    db: &Database,
    id: &str,
    entity_id: &str,
    amount: i32,
) -> Result<AddEntryResponse, String> {
    let id = parse_id(id, "daily intake")?;
    let entity_id = parse_id(entity_id, "entity")?;

    let (intake, added) = db
        .with_conn(|conn| daily_intakes::add_entry(conn, id, entity_id, amount))
        .map_err(|e| format!("Failed to add entry: {}", e))?
        .ok_or_else(|| format!("Daily intake not found with id: {}", id))?;

    Ok(AddEntryResponse {
        added,
        message: (!added).then(|| format!("Amount must be greater than zero, got {}", amount)),
        intake: DailyIntakeSummary::from(&intake),
    })
}

pub fn rename_daily_intake(db: &Database, id: &str, name: &str) -> Result<DailyIntakeSummary, String> {
    let id = parse_id(id, "daily intake")?;

    let intake = db
        .with_conn(|conn| daily_intakes::rename(conn, id, name))
        .map_err(|e| format!("Failed to rename daily intake: {}", e))?
        .ok_or_else(|| format!("Daily intake not found with id: {}", id))?;

    Ok(DailyIntakeSummary::from(&intake))
}

pub fn delete_daily_intake(db: &Database, id: &str) -> Result<DeleteResponse, String> {
    let id = parse_id(id, "daily intake")?;

    let deleted = db
        .with_conn(|conn| daily_intakes::delete(conn, id))
        .map_err(|e| format!("Failed to delete daily intake: {}", e))?;

    if !deleted {
        return Err(format!("Daily intake not found with id: {}", id));
    }
    Ok(DeleteResponse {
        success: true,
        deleted_id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::categories::create_category;
    use crate::tools::ingredients::add_ingredient;
    use crate::tools::recipes::{create_recipe, MeasurementInput};
    use crate::tools::test_database;

    fn setup() -> (Database, String, String) {
        let db = test_database();
        let fish = create_category(&db, "Fish", "ingredient", 0).unwrap().id.unwrap();
        let lunch = create_category(&db, "Lunch", "recipe", 0).unwrap().id.unwrap();
        let per_100g = Nutrition { fat: 1.0, carbohydrates: 0.5, protein: 25.0, calories: 120.0 };
        let tuna = add_ingredient(&db, "Tuna", per_100g, &fish).unwrap().id.unwrap();
        let line = MeasurementInput {
            id: None,
            ingredient_id: tuna.clone(),
            measurement: 1.0,
            unit: "piece".to_string(),
            grams: 200.0,
            note: "Drained".to_string(),
            sort_order: None,
        };
        let salad = create_recipe(&db, "Tuna Salad", "Toss", 1, &lunch, &[line]).unwrap().id.unwrap();
        (db, tuna, salad)
    }

    #[test]
    fn test_create_and_get_resolved() {
        let (db, tuna, salad) = setup();
        let entries = [
            EntryInput { entity_id: salad.clone(), amount: 1 },
            EntryInput { entity_id: tuna.clone(), amount: 80 },
        ];
        let created = create_daily_intake(&db, "Monday", &entries).unwrap();
        assert_eq!(created.entries.len(), 2);
        assert!(created.entries[0].is_recipe);
        assert_eq!(created.entries[0].name, "Tuna Salad");
        assert!((created.entries[0].nutrition.calories - 240.0).abs() < 1e-9);
        assert!(!created.entries[1].is_recipe);
        assert_eq!(created.entries[1].amount, 80);

        let fetched = get_daily_intake(&db, created.id.as_deref().unwrap()).unwrap().unwrap();
        assert_eq!(fetched.entries.len(), 2);
    }

    #[test]
    fn test_create_rejects_bad_entries() {
        let (db, tuna, _) = setup();
        let zero = [EntryInput { entity_id: tuna, amount: 0 }];
        assert!(create_daily_intake(&db, "Monday", &zero).is_err());
        let unknown = [EntryInput { entity_id: uuid::Uuid::new_v4().to_string(), amount: 1 }];
        assert!(create_daily_intake(&db, "Monday", &unknown).is_err());
        assert_eq!(list_daily_intakes(&db).unwrap().total, 0);
    }

    #[test]
    fn test_add_entry_rename_delete() {
        let (db, tuna, _) = setup();
        let id = create_daily_intake(&db, "Monday", &[]).unwrap().id.unwrap();

        let response = add_daily_intake_entry(&db, &id, &tuna, 100).unwrap();
        assert!(response.added);
        assert_eq!(response.intake.entry_count, 1);

        let response = add_daily_intake_entry(&db, &id, &tuna, -5).unwrap();
        assert!(!response.added);
        assert!(response.message.is_some());
        assert_eq!(response.intake.entry_count, 1);

        assert_eq!(rename_daily_intake(&db, &id, "Tuesday").unwrap().name, "Tuesday");
        assert!(rename_daily_intake(&db, &id, "").is_err());

        assert!(delete_daily_intake(&db, &id).unwrap().success);
        assert!(get_daily_intake(&db, &id).unwrap().is_none());
    }
}
