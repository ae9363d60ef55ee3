//! Recept MCP Server Implementation
//!
//! Implements the MCP server with all Recept tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::Nutrition;
use crate::tools::categories;
use crate::tools::daily_intakes::{self, EntryInput};
use crate::tools::ingredients::{self, IngredientChanges};
use crate::tools::recipes::{self, MeasurementInput, RecipeChangesInput};
use crate::tools::status::StatusTracker;

/// Recept MCP Service
#[derive(Clone)]
pub struct ReceptService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<ReceptService>,
}

impl ReceptService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Serialize a tool result as pretty JSON
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(entity: &str, id: &str) -> Result<CallToolResult, McpError> {
    json_result(&serde_json::json!({ "error": format!("{} not found", entity), "id": id }))
}

// ============================================================================
// Category Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateCategoryParams {
    pub name: String,
    /// "ingredient" or "recipe"
    pub kind: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCategoriesParams {
    /// "ingredient" or "recipe"; omit for both
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetCategorySortOrderParams {
    pub id: String,
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: String,
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddIngredientParams {
    pub name: String,
    /// Grams of fat per 100 g
    pub fat: f64,
    /// Grams of carbohydrates per 100 g
    pub carbohydrates: f64,
    /// Grams of protein per 100 g
    pub protein: f64,
    /// Kilocalories per 100 g
    pub calories: f64,
    pub category_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListByCategoryParams {
    pub category_id: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateIngredientParams {
    pub id: String,
    pub name: Option<String>,
    pub fat: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub protein: Option<f64>,
    pub calories: Option<f64>,
    pub category_id: Option<String>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    pub name: String,
    pub instructions: String,
    pub portion_amount: i32,
    pub category_id: String,
    #[serde(default)]
    pub measurements: Vec<MeasurementInput>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    pub id: String,
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub portion_amount: Option<i32>,
    pub category_id: Option<String>,
    /// Complete new measurement list. Lines with an id are updated, lines
    /// without one are added and stored lines not listed are removed.
    pub measurements: Option<Vec<MeasurementInput>>,
}

// ============================================================================
// Daily Intake Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateDailyIntakeParams {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<EntryInput>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddDailyIntakeEntryParams {
    pub id: String,
    /// Id of an ingredient or a recipe
    pub entity_id: String,
    pub amount: i32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RenameDailyIntakeParams {
    pub id: String,
    pub name: String,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl ReceptService {
    // --- Status ---

    #[tool(description = "Get the current status of the Recept service including build info, database status and uptime")]
    async fn recept_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    // --- Categories ---

    #[tool(description = "Create a category for ingredients or recipes")]
    fn create_category(&self, Parameters(p): Parameters<CreateCategoryParams>) -> Result<CallToolResult, McpError> {
        let result = categories::create_category(&self.database, &p.name, &p.kind, p.sort_order)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List categories in sort order, optionally only ingredient or recipe categories")]
    fn list_categories(&self, Parameters(p): Parameters<ListCategoriesParams>) -> Result<CallToolResult, McpError> {
        let result = categories::list_categories(&self.database, p.kind.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Change the sort position of a category")]
    fn set_category_sort_order(&self, Parameters(p): Parameters<SetCategorySortOrderParams>) -> Result<CallToolResult, McpError> {
        let result = categories::set_category_sort_order(&self.database, &p.id, p.sort_order)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a category (only allowed if no ingredient or recipe uses it)")]
    fn delete_category(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = categories::delete_category(&self.database, &p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Ingredients ---

    #[tool(description = "Create an ingredient with fat, carbohydrates, protein and calories per 100 g. The category must be an ingredient category.")]
    fn add_ingredient(&self, Parameters(p): Parameters<AddIngredientParams>) -> Result<CallToolResult, McpError> {
        let per_100g = Nutrition {
            fat: p.fat,
            carbohydrates: p.carbohydrates,
            protein: p.protein,
            calories: p.calories,
        };
        let result = ingredients::add_ingredient(&self.database, &p.name, per_100g, &p.category_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get an ingredient with its nutrients and how often it is used")]
    fn get_ingredient(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::get_ingredient(&self.database, &p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => json_result(&detail),
            None => not_found("Ingredient", &p.id),
        }
    }

    #[tool(description = "List ingredients by name, optionally within one category")]
    fn list_ingredients(&self, Parameters(p): Parameters<ListByCategoryParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::list_ingredients(&self.database, p.category_id.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update an ingredient. Invalid values are ignored and listed under 'rejected'.")]
    fn update_ingredient(&self, Parameters(p): Parameters<UpdateIngredientParams>) -> Result<CallToolResult, McpError> {
        let changes = IngredientChanges {
            name: p.name,
            fat: p.fat,
            carbohydrates: p.carbohydrates,
            protein: p.protein,
            calories: p.calories,
            category_id: p.category_id,
        };
        let result = ingredients::update_ingredient(&self.database, &p.id, changes)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete an ingredient (only allowed if no recipe or daily intake uses it)")]
    fn delete_ingredient(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::delete_ingredient(&self.database, &p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Create a recipe with ingredient measurements. Each ingredient may appear once. The category must be a recipe category.")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::create_recipe(
            &self.database,
            &p.name,
            &p.instructions,
            p.portion_amount,
            &p.category_id,
            &p.measurements,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a recipe with its measurements, total nutrition and nutrition per portion")]
    fn get_recipe(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, &p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => json_result(&detail),
            None => not_found("Recipe", &p.id),
        }
    }

    #[tool(description = "List recipes by name, optionally within one category")]
    fn list_recipes(&self, Parameters(p): Parameters<ListByCategoryParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.category_id.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update a recipe. When 'measurements' is given it replaces the list: lines with an id are updated in place, lines without an id are added, stored lines not listed are removed.")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let input = RecipeChangesInput {
            name: p.name,
            instructions: p.instructions,
            portion_amount: p.portion_amount,
            category_id: p.category_id,
            measurements: p.measurements,
        };
        let result = recipes::update_recipe(&self.database, &p.id, input)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a recipe and its measurements (only allowed if no daily intake logs it)")]
    fn delete_recipe(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, &p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Daily Intakes ---

    #[tool(description = "Create a named daily intake log, optionally with entries referencing ingredients or recipes")]
    fn create_daily_intake(&self, Parameters(p): Parameters<CreateDailyIntakeParams>) -> Result<CallToolResult, McpError> {
        let result = daily_intakes::create_daily_intake(&self.database, &p.name, &p.entries)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a daily intake with every entry resolved to its ingredient or recipe")]
    fn get_daily_intake(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = daily_intakes::get_daily_intake(&self.database, &p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => json_result(&detail),
            None => not_found("Daily intake", &p.id),
        }
    }

    #[tool(description = "List daily intakes by name")]
    fn list_daily_intakes(&self) -> Result<CallToolResult, McpError> {
        let result = daily_intakes::list_daily_intakes(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Append an ingredient or recipe to a daily intake. Amounts of zero or less are not logged.")]
    fn add_daily_intake_entry(&self, Parameters(p): Parameters<AddDailyIntakeEntryParams>) -> Result<CallToolResult, McpError> {
        let result = daily_intakes::add_daily_intake_entry(&self.database, &p.id, &p.entity_id, p.amount)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Rename a daily intake")]
    fn rename_daily_intake(&self, Parameters(p): Parameters<RenameDailyIntakeParams>) -> Result<CallToolResult, McpError> {
        let result = daily_intakes::rename_daily_intake(&self.database, &p.id, &p.name)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a daily intake and its entries")]
    fn delete_daily_intake(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = daily_intakes::delete_daily_intake(&self.database, &p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for ReceptService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "recept".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Recept Nutrition Manager".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Recept - ingredients, recipes and daily intake logs. \
                 Nutrients are stored per 100 g of ingredient. \
                 Categories: create/list/delete_category, set_category_sort_order (kind is 'ingredient' or 'recipe'). \
                 Ingredients: add/get/list/update/delete_ingredient. \
                 Recipes: create/get/list/update/delete_recipe; update_recipe takes the full measurement list. \
                 Daily intakes: create/get/list/delete_daily_intake, add_daily_intake_entry, rename_daily_intake. \
                 Status: recept_status."
                    .into(),
            ),
        }
    }
}
