//! The foundry production schema.

use sahayak_core::schema::{
    ColumnDescriptor, JoinKey, SchemaDescriptor, SemanticType, TableDescriptor,
};
use sahayak_core::schema::SemanticType::{Categorical, Date, Identifier, Numeric, Text, Timestamp};

fn col(name: &str, semantic: SemanticType, aliases: &[&str]) -> ColumnDescriptor {
    ColumnDescriptor::new(name, semantic).with_aliases(aliases)
}

fn measure(name: &str, unit: &str, aliases: &[&str]) -> ColumnDescriptor {
    ColumnDescriptor::new(name, Numeric)
        .with_unit(unit)
        .with_aliases(aliases)
}

fn table(
    name: &str,
    description: &str,
    nouns: &[&str],
    date_column: &str,
    columns: Vec<ColumnDescriptor>,
) -> TableDescriptor {
    TableDescriptor {
        name: name.into(),
        description: description.into(),
        nouns: nouns.iter().map(|n| n.to_string()).collect(),
        date_column: Some(date_column.into()),
        columns,
    }
}

/// Tables of the foundry ERP/MES database, melt shop to maintenance.
///
/// Table order matters: when two tables share an alias, templates built
/// from the earlier table are tried first.
pub fn foundry_schema() -> SchemaDescriptor {
    let tables = vec![
        table(
            "melting_heat_records",
            "Furnace melt log, one row per heat",
            &["heats", "heat records", "melting records", "melts"],
            "melt_date",
            vec![
                col("heat_number", Identifier, &[]),
                col("furnace_id", Categorical, &["furnace"]),
                col("furnace_type", Categorical, &["furnace type"]),
                col("melt_date", Date, &[]),
                col("shift", Categorical, &["shift"]),
                col("operator_id", Categorical, &["operator"]),
                col("target_alloy", Categorical, &["alloy", "target alloy"]),
                measure("charge_weight_kg", "kg", &["charge weight"]),
                measure("carbon_percentage", "%", &["carbon", "carbon content"]),
                measure("silicon_percentage", "%", &["silicon", "silicon content"]),
                measure(
                    "tap_temperature_c",
                    "°C",
                    &["tap temperature", "tapping temperature"],
                ),
                measure("pour_temperature_c", "°C", &["pour temperature"]),
                measure("holding_time_min", "min", &["holding time"]),
                col("quality_status", Categorical, &["quality status"]),
                col("rejection_reason", Categorical, &["rejection reason"]),
            ],
        ),
        table(
            "molding_records",
            "Mould production per order and line",
            &["molding records", "moulding records", "molds", "moulds"],
            "mold_date",
            vec![
                col("production_order", Identifier, &[]),
                col("molding_line", Categorical, &["molding line", "line"]),
                col("molding_type", Categorical, &["molding type"]),
                col("product_type", Categorical, &["product type", "product"]),
                col("mold_date", Date, &[]),
                col("shift", Categorical, &["shift"]),
                measure("planned_quantity", "pcs", &["planned quantity"]),
                measure("actual_quantity", "pcs", &["actual quantity", "molds produced"]),
                col("sand_type", Categorical, &["sand type"]),
                col("binder_type", Categorical, &["binder type", "binder"]),
                measure(
                    "moisture_content_pct",
                    "%",
                    &["moisture", "moisture content", "sand moisture"],
                ),
                col("quality_check", Categorical, &["quality check"]),
                col("defect_type", Categorical, &["defect type"]),
                measure("cycle_time_seconds", "s", &["cycle time", "molding cycle time"]),
            ],
        ),
        table(
            "casting_records",
            "Pouring results per casting batch",
            &["castings", "casting records", "casting batches"],
            "casting_date",
            vec![
                col("casting_batch", Identifier, &[]),
                col("heat_number", Identifier, &[]),
                col("production_order", Identifier, &[]),
                col("casting_date", Date, &[]),
                col("shift", Categorical, &["shift"]),
                col("product_type", Categorical, &["product type", "product"]),
                measure(
                    "metal_weight_poured_kg",
                    "kg",
                    &["metal poured", "metal weight poured", "poured weight"],
                ),
                measure("pouring_temperature_c", "°C", &["pouring temperature"]),
                measure("good_castings", "pcs", &["good castings"]),
                measure("scrap_castings", "pcs", &["scrap castings", "scrapped castings"]),
                measure("yield_percentage", "%", &["yield", "casting yield"]),
                col("defects_detected", Categorical, &["defects detected"]),
                col("quality_grade", Categorical, &["quality grade", "grade"]),
            ],
        ),
        table(
            "heat_treatments",
            "Heat treatment furnace batches",
            &["heat treatments", "heat treatment batches", "ht batches"],
            "treatment_date",
            vec![
                col("ht_batch_number", Identifier, &[]),
                col("casting_batch", Identifier, &[]),
                col("furnace_id", Categorical, &["furnace"]),
                col("treatment_date", Date, &[]),
                col("treatment_type", Categorical, &["treatment type"]),
                col("product_type", Categorical, &["product type", "product"]),
                measure("target_temperature_c", "°C", &["target temperature"]),
                measure(
                    "actual_temperature_c",
                    "°C",
                    &["actual temperature", "treatment temperature"],
                ),
                measure("holding_time_hours", "h", &["soak time", "treatment holding time"]),
                col("cooling_method", Categorical, &["cooling method"]),
                measure("post_ht_hardness_hb", "HB", &["hardness"]),
                col("quality_status", Categorical, &["quality status"]),
                col("rejection_reason", Categorical, &["rejection reason"]),
            ],
        ),
        table(
            "machining_operations",
            "Machining operations with dimensional results",
            &["machining operations", "machining records", "operations"],
            "operation_date",
            vec![
                col("operation_id", Identifier, &[]),
                col("production_order", Identifier, &[]),
                col("operation_date", Date, &[]),
                col("machine_type", Categorical, &["machine type", "machine"]),
                col("operation_type", Categorical, &["operation type"]),
                col("product_type", Categorical, &["product type", "product"]),
                measure("cycle_time_seconds", "s", &["machining cycle time"]),
                measure(
                    "measured_deviation_mm",
                    "mm",
                    &["deviation", "dimensional deviation"],
                ),
                measure("surface_roughness_ra", "µm Ra", &["surface roughness", "roughness"]),
                col("quality_status", Categorical, &["quality status"]),
                col("defect_type", Categorical, &["defect type"]),
            ],
        ),
        table(
            "quality_inspections",
            "Inspection lots and decisions",
            &["inspections", "quality inspections", "inspection lots"],
            "inspection_date",
            vec![
                col("inspection_lot", Identifier, &[]),
                col("inspection_date", Date, &[]),
                col("inspection_stage", Categorical, &["inspection stage", "stage"]),
                col("material_number", Categorical, &["material"]),
                measure("quantity_inspected", "pcs", &["quantity inspected", "inspected quantity"]),
                measure("defect_count", "pcs", &["defect count", "defects"]),
                measure("major_defects", "pcs", &["major defects"]),
                measure("minor_defects", "pcs", &["minor defects"]),
                col(
                    "overall_decision",
                    Categorical,
                    &["decision", "overall decision", "inspection decision"],
                ),
            ],
        ),
        table(
            "equipment_maintenance",
            "Maintenance orders, downtime and cost per equipment",
            &["maintenance orders", "maintenance records", "equipment maintenance"],
            "planned_start",
            vec![
                col("maintenance_order", Identifier, &[]),
                col("equipment_number", Categorical, &["equipment"]),
                col("equipment_type", Categorical, &["equipment type"]),
                col("maintenance_type", Categorical, &["maintenance type"]),
                col("status", Categorical, &["status"]),
                col("priority", Categorical, &["priority"]),
                col("planned_start", Timestamp, &[]),
                measure("downtime_hours", "h", &["downtime"]),
                measure("labor_hours", "h", &["labor hours", "labour hours"]),
                measure("total_cost_usd", "USD", &["maintenance cost", "repair cost"]),
                col("failure_code", Categorical, &["failure code", "failure"]),
            ],
        ),
        table(
            "production_orders",
            "Production orders and their confirmations",
            &["production orders", "work orders", "orders"],
            "planned_start_date",
            vec![
                col("production_order", Identifier, &[]),
                col("order_type", Categorical, &["order type"]),
                col("material_number", Categorical, &["material"]),
                col("product_type", Categorical, &["product type", "product"]),
                col("plant", Categorical, &["plant"]),
                measure("order_quantity", "pcs", &["order quantity", "ordered quantity"]),
                measure("confirmed_quantity", "pcs", &["confirmed quantity"]),
                measure("scrap_quantity", "pcs", &["scrap quantity", "scrap"]),
                col("order_status", Categorical, &["order status", "status"]),
                col("priority", Categorical, &["priority"]),
                col("planned_start_date", Date, &[]),
            ],
        ),
        table(
            "inventory_movements",
            "Goods movements with stock before and after",
            &["inventory movements", "stock movements", "goods movements", "movements"],
            "posting_date",
            vec![
                col("document_number", Identifier, &[]),
                col("document_date", Date, &[]),
                col("posting_date", Date, &[]),
                col("movement_type", Categorical, &["movement type"]),
                col("material_number", Categorical, &["material"]),
                col("material_type", Categorical, &["material type"]),
                col("plant", Categorical, &["plant"]),
                measure("quantity", "unit", &["quantity", "moved quantity"]),
                col("unit", Categorical, &[]),
                measure("amount_usd", "USD", &["amount", "inventory value"]),
                measure("stock_before", "unit", &["stock before"]),
                measure("stock_after", "unit", &["stock after", "stock level"]),
                col("reason_code", Categorical, &["reason code", "reason"]),
            ],
        ),
        table(
            "material_master",
            "Material master data",
            &["materials", "material master"],
            "created_date",
            vec![
                col("material_number", Identifier, &[]),
                col("material_type", Categorical, &["material type"]),
                col("description", Text, &[]),
                col("base_unit", Categorical, &[]),
                measure("net_weight_kg", "kg", &["net weight"]),
                measure("gross_weight_kg", "kg", &["gross weight"]),
                measure("standard_price_usd", "USD", &["standard price"]),
                col("plant", Categorical, &["plant"]),
                col("storage_location", Categorical, &["storage location"]),
                measure("safety_stock", "unit", &["safety stock"]),
                measure("lot_size", "unit", &["lot size"]),
                col("procurement_type", Categorical, &["procurement type"]),
                col("created_date", Date, &[]),
            ],
        ),
        table(
            "bill_of_materials",
            "Bill of materials components per parent material",
            &["bill of materials", "bom", "boms"],
            "valid_from",
            vec![
                col("bom_number", Identifier, &[]),
                col("parent_material", Categorical, &["parent material"]),
                col("component_material", Categorical, &["component"]),
                col("component_type", Categorical, &["component type"]),
                measure("component_quantity", "unit", &["component quantity"]),
                col("component_unit", Categorical, &[]),
                col("bom_status", Categorical, &["bom status"]),
                measure("scrap_percentage", "%", &["scrap percentage"]),
                col("plant", Categorical, &["plant"]),
                col("valid_from", Date, &[]),
                col("component_criticality", Categorical, &["criticality"]),
            ],
        ),
    ];

    let joins = vec![
        JoinKey::new(
            ("melting_heat_records", "heat_number"),
            ("casting_records", "heat_number"),
        ),
        JoinKey::new(
            ("production_orders", "production_order"),
            ("molding_records", "production_order"),
        ),
        JoinKey::new(
            ("production_orders", "production_order"),
            ("casting_records", "production_order"),
        ),
        JoinKey::new(
            ("production_orders", "production_order"),
            ("machining_operations", "production_order"),
        ),
        JoinKey::new(
            ("casting_records", "casting_batch"),
            ("heat_treatments", "casting_batch"),
        ),
        JoinKey::new(
            ("material_master", "material_number"),
            ("inventory_movements", "material_number"),
        ),
        JoinKey::new(
            ("material_master", "material_number"),
            ("production_orders", "material_number"),
        ),
        JoinKey::new(
            ("material_master", "material_number"),
            ("quality_inspections", "material_number"),
        ),
        JoinKey::new(
            ("material_master", "material_number"),
            ("bill_of_materials", "parent_material"),
        ),
    ];

    SchemaDescriptor { tables, joins }
}
