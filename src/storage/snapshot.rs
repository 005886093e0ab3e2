//! JSON snapshots of a whole database
//!
//! Only schemas and rows are written; indexes are rebuilt on load by
//! re-inserting every row, so a restored table satisfies the same invariants
//! as one populated through `insert`.

use super::table::Table;
use super::value::Row;
use crate::catalog::Column;
use crate::error::{Error, Result};
use crate::executor::Database;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Serializable proxy for Database
#[derive(Debug, Serialize, Deserialize)]
struct DatabaseData {
    name: String,
    tables: Vec<TableData>,
}

/// Serializable proxy for Table
#[derive(Debug, Serialize, Deserialize)]
struct TableData {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl From<&Table> for TableData {
    fn from(table: &Table) -> Self {
        Self {
            name: table.name().to_string(),
            columns: table.schema().columns().to_vec(),
            rows: table.select_all(),
        }
    }
}

impl TableData {
    fn restore(self) -> Result<Table> {
        let mut table = Table::new(self.name, self.columns);
        for row in self.rows {
            table.insert(row)?;
        }
        Ok(table)
    }
}

/// Serialize a database to pretty JSON
pub fn to_json(db: &Database) -> Result<String> {
    let data = DatabaseData {
        name: db.name().to_string(),
        tables: db.tables().map(TableData::from).collect(),
    };
    serde_json::to_string_pretty(&data).map_err(|e| Error::Serialization(e.to_string()))
}

/// Rebuild a database from JSON produced by [`to_json`]
pub fn from_json(json: &str) -> Result<Database> {
    let data: DatabaseData =
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
    let mut db = Database::new(data.name);
    for table in data.tables {
        db.create_table(table.restore()?)?;
    }
    Ok(db)
}

/// Save database to disk
pub fn save(db: &Database, path: &Path) -> Result<()> {
    let json = to_json(db)?;
    std::fs::write(path, json)?;
    debug!(path = %path.display(), tables = db.list_tables().len(), "snapshot saved");
    Ok(())
}

/// Load database from disk
pub fn load(path: &Path) -> Result<Database> {
    let json = std::fs::read_to_string(path)?;
    let db = from_json(&json)?;
    debug!(path = %path.display(), tables = db.list_tables().len(), "snapshot loaded");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DataType, TableBuilder};
    use crate::row;
    use crate::storage::Value;

    #[test]
    fn test_json_round_trip() {
        let mut db = Database::new("shop");
        TableBuilder::new("items")
            .primary_key("id")
            .column_unique("sku", DataType::Text)
            .column("price", DataType::Float)
            .column("active", DataType::Boolean)
            .create_in(&mut db)
            .unwrap();
        let items = db.table_mut("items").unwrap();
        items
            .insert(row! { "id" => 1, "sku" => "A-1", "price" => 2, "active" => true })
            .unwrap();
        items.insert(row! { "id" => 2, "sku" => Value::Null }).unwrap();

        let restored = from_json(&to_json(&db).unwrap()).unwrap();
        assert_eq!(restored.name(), "shop");
        let items = restored.table("items").unwrap();
        assert_eq!(items.select_all(), db.table("items").unwrap().select_all());
        assert_eq!(
            items.get_by_primary_key(&Value::Integer(1)).unwrap().unwrap()["price"],
            Value::Float(2.0)
        );
        assert!(items.schema().get_column("sku").unwrap().unique);
    }

    #[test]
    fn test_float_extremes_survive_round_trip() {
        let mut db = Database::new("lab");
        TableBuilder::new("readings")
            .with_column(Column::new("reading", DataType::Float).primary_key(true))
            .column_not_null("weight", DataType::Float)
            .create_in(&mut db)
            .unwrap();
        let readings = db.table_mut("readings").unwrap();
        for (reading, weight) in [(f64::MAX, f64::MIN_POSITIVE), (f64::MIN, -1e-300)] {
            readings
                .insert(row! { "reading" => reading, "weight" => weight })
                .unwrap();
        }
        assert!(readings
            .insert(row! { "reading" => f64::INFINITY, "weight" => 1.0 })
            .is_err());
        assert!(readings
            .insert(row! { "reading" => 1.0, "weight" => f64::NAN })
            .is_err());

        let restored = from_json(&to_json(&db).unwrap()).unwrap();
        let readings = restored.table("readings").unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(
            readings.get_by_primary_key(&Value::Float(f64::MAX)).unwrap().unwrap()["weight"],
            Value::Float(f64::MIN_POSITIVE)
        );
        assert_eq!(readings.select_all(), db.table("readings").unwrap().select_all());
    }

    #[test]
    fn test_corrupt_snapshot_is_rejected() {
        let json = r#"{"name":"x","tables":[{"name":"t","columns":[
            {"name":"id","data_type":"Integer","primary_key":true,"unique":false,"not_null":true}],
            "rows":[{"id":1},{"id":1}]}]}"#;
        assert!(matches!(
            from_json(json),
            Err(Error::ConstraintViolation(_))
        ));
        assert!(matches!(from_json("{"), Err(Error::Serialization(_))));
    }
}
