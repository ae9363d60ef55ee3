//! Daily intake store

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::connection::{parse_id, DbError, DbResult};
use super::{ingredients, recipes};
use crate::models::validation::check_text;
use crate::models::{DailyIntake, Field, Identity, IntakeCatalog, ResolvedEntry};

/// Whether an id names a stored ingredient or recipe
pub fn entity_exists(conn: &Connection, id: Uuid) -> DbResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM ingredients WHERE id = ?1)
              + (SELECT COUNT(*) FROM recipes WHERE id = ?1)",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn require_entity(conn: &Connection, id: Uuid) -> DbResult<()> {
    if !entity_exists(conn, id)? {
        return Err(DbError::NotFound { entity: "Ingredient or recipe", id });
    }
    Ok(())
}

fn insert_entry(
    conn: &Connection,
    intake_id: Uuid,
    entity_id: Uuid,
    amount: i32,
    sort_order: i32,
) -> DbResult<Uuid> {
    let id = Identity::generate();
    conn.execute(
        r#"
        INSERT INTO daily_intake_entries (id, daily_intake_id, entity_id, amount, sort_order)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            id.to_string(),
            intake_id.to_string(),
            entity_id.to_string(),
            amount,
            sort_order,
        ],
    )?;
    Ok(id)
}

/// Insert an intake and its entries in one transaction. Every entry must
/// reference a stored ingredient or recipe.
pub fn insert(conn: &mut Connection, intake: &DailyIntake) -> DbResult<DailyIntake> {
    let id = intake.id().uuid().unwrap_or_else(Identity::generate);

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO daily_intakes (id, name) VALUES (?1, ?2)",
        params![id.to_string(), intake.name()],
    )?;
    for entry in intake.entries() {
        require_entity(&tx, entry.entity_id())?;
        insert_entry(&tx, id, entry.entity_id(), entry.amount(), entry.sort_order())?;
    }
    tx.commit()?;

    get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Daily intake", id })
}

pub fn get_by_id(conn: &Connection, id: Uuid) -> DbResult<Option<DailyIntake>> {
    let name: Option<String> = conn
        .query_row(
            "SELECT name FROM daily_intakes WHERE id = ?1",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    let Some(name) = name else {
        return Ok(None);
    };

    let mut intake = DailyIntake::new(&name)?.with_id(id);

    let mut stmt = conn.prepare(
        "SELECT id, entity_id, amount FROM daily_intake_entries
         WHERE daily_intake_id = ?1 ORDER BY sort_order ASC",
    )?;
    let rows = stmt
        .query_map([id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i32>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (entry_id, entity_id, amount) in rows {
        let index = intake.entries().len();
        if intake.add_entry(parse_id(&entity_id)?, amount) {
            intake.assign_entry_id(index, parse_id(&entry_id)?);
        }
    }

    Ok(Some(intake))
}

/// List intakes by name
pub fn list(conn: &Connection) -> DbResult<Vec<DailyIntake>> {
    let mut stmt = conn.prepare("SELECT id FROM daily_intakes ORDER BY name ASC")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut intakes = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(intake) = get_by_id(conn, parse_id(&id)?)? {
            intakes.push(intake);
        }
    }
    Ok(intakes)
}

pub fn rename(conn: &Connection, id: Uuid, name: &str) -> DbResult<Option<DailyIntake>> {
    let Some(mut intake) = get_by_id(conn, id)? else {
        return Ok(None);
    };
    check_text(Field::Name, name)?;
    intake.set_name(name);

    conn.execute(
        "UPDATE daily_intakes SET name = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![intake.name(), id.to_string()],
    )?;
    Ok(Some(intake))
}

/// Append an entry to a stored intake.
///
/// The referenced entity must exist. Whether the entry is accepted is up to
/// [`DailyIntake::add_entry`]; the flag in the result reports it.
pub fn add_entry(
    conn: &Connection,
    intake_id: Uuid,
    entity_id: Uuid,
    amount: i32,
) -> DbResult<Option<(DailyIntake, bool)>> {
    let Some(mut intake) = get_by_id(conn, intake_id)? else {
        return Ok(None);
    };
    require_entity(conn, entity_id)?;

    if !intake.add_entry(entity_id, amount) {
        return Ok(Some((intake, false)));
    }

    let index = intake.entries().len() - 1;
    let sort_order = intake.entries()[index].sort_order();
    let entry_id = insert_entry(conn, intake_id, entity_id, amount, sort_order)?;
    intake.assign_entry_id(index, entry_id);
    Ok(Some((intake, true)))
}

/// Load the ingredients and recipes an intake references and resolve its entries
pub fn resolve(conn: &Connection, id: Uuid) -> DbResult<Option<(DailyIntake, Vec<ResolvedEntry>)>> {
    let Some(intake) = get_by_id(conn, id)? else {
        return Ok(None);
    };

    let mut catalog = IntakeCatalog::default();
    for entry in intake.entries() {
        let entity_id = entry.entity_id();
        if catalog.ingredients.contains_key(&entity_id) || catalog.recipes.contains_key(&entity_id) {
            continue;
        }
        if let Some(ingredient) = ingredients::get_by_id(conn, entity_id)? {
            catalog.ingredients.insert(entity_id, ingredient);
        } else if let Some(recipe) = recipes::get_by_id(conn, entity_id)? {
            catalog.recipes.insert(entity_id, recipe);
        }
    }

    let resolved = intake.resolve(&catalog)?;
    Ok(Some((intake, resolved)))
}

/// Delete an intake and its entries. Returns Ok(false) if it does not exist.
pub fn delete(conn: &Connection, id: Uuid) -> DbResult<bool> {
    let rows = conn.execute("DELETE FROM daily_intakes WHERE id = ?1", [id.to_string()])?;
    Ok(rows > 0)
}
