//! Entity-relationship rendering (Mermaid `erDiagram` notation).

use crate::model::SchemaSnapshot;

/// One entity block per table (type, name, `PK` marker per column) and one
/// `||--o{` edge per foreign key, from the referenced table to the
/// referencing one, labelled with the referencing column.
pub fn render_er_diagram(snapshot: &SchemaSnapshot) -> String {
    let mut out = String::from("erDiagram\n");

    for table in &snapshot.table_info {
        out.push_str(&format!("    {} {{\n", entity_name(&table.name)));
        for col in &table.columns {
            out.push_str(&format!(
                "        {} {}{}\n",
                attribute_type(&col.declared_type),
                entity_name(&col.name),
                if col.primary_key { " PK" } else { "" }
            ));
        }
        out.push_str("    }\n");
    }

    for table in &snapshot.table_info {
        for fk in &table.foreign_keys {
            out.push_str(&format!(
                "    {} ||--o{{ {} : \"{}\"\n",
                entity_name(&fk.to_table),
                entity_name(&table.name),
                fk.from_column.replace('"', "'")
            ));
        }
    }

    out
}

// Mermaid identifiers allow word characters and hyphens only.
fn entity_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

fn attribute_type(declared: &str) -> String {
    let t = declared.trim();
    if t.is_empty() {
        return "ANY".to_string();
    }
    // "VARCHAR(20)" -> "VARCHAR_20"
    let cleaned: String = t
        .chars()
        .filter(|c| *c != ')')
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    cleaned.trim_matches('_').to_string()
}
