//! Tests for memberwise-model providers working together.

use std::sync::Arc;

use memberwise_model::{
    Getter, Member, MemberKind, MemberProvider, MemberSet, ModelError, Operation, Record,
    RecordSchema, Reflect, Reflected, Row, RowSchema, Setter, Value, ValueType, member_enum,
    reflect,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Status {
    #[default]
    Draft,
    Final = 3,
}

member_enum!(Status { Draft, Final => "FINAL" });

#[derive(Debug, Clone, Default, PartialEq)]
struct Visit {
    id: u32,
    site: String,
    weight: Option<f64>,
    status: Status,
}

reflect!(Visit {
    "Id" => id,
    "Site" => site,
    "Weight" => weight,
    "Status" => status,
});

#[test]
fn reflected_struct_exposes_typed_members() {
    let members = Reflected::<Visit>::new().members();
    let types: Vec<String> = members.iter().map(|m| m.value_type().to_string()).collect();
    assert_eq!(types, ["u32", "string", "Option<f64>", "Status"]);
    assert!(members.iter().all(|m| m.kind() == MemberKind::Field));
    assert!(members.iter().all(|m| m.can_read() && m.can_write()));
}

#[test]
fn reflected_members_write_through() {
    let members = Visit::members();
    let mut visit = Visit::default();
    members[2].write(&mut visit, Value::F64(72.5)).unwrap();
    members[3].write(&mut visit, Value::Enum(3)).unwrap();

    assert_eq!(visit.weight, Some(72.5));
    assert_eq!(visit.status, Status::Final);
    assert_eq!(members[3].read(&visit).unwrap(), Value::Enum(3));
}

#[test]
fn reflected_write_rejects_wrong_kind() {
    let members = Visit::members();
    let mut visit = Visit::default();
    let err = members[0].write(&mut visit, Value::I32(1)).unwrap_err();
    assert_eq!(err.to_string(), "expected a value of type u32, got i32 1");
    assert_eq!(visit, Visit::default());
}

#[test]
fn record_and_declared_accessors_have_same_shape() {
    let from_record = RecordSchema::new("Visit")
        .column("Site", ValueType::String)
        .members();
    let get: Getter<Visit> =
        Arc::new(|visit: &Visit| Ok::<_, ModelError>(Value::Str(visit.site.clone())));
    let set: Setter<Visit> = Arc::new(|visit: &mut Visit, value: Value| {
        visit.site = value.as_str().unwrap_or_default().to_string();
        Ok::<_, ModelError>(())
    });
    let declared = MemberSet::new()
        .accessor("Site", ValueType::String, Some(get), Some(set))
        .members();

    assert_eq!(from_record[0].name(), declared[0].name());
    assert_eq!(from_record[0].kind(), declared[0].kind());
    assert_eq!(from_record[0].value_type(), declared[0].value_type());
}

#[test]
fn computed_member_is_read_only() {
    let label = Member::computed("Label", |visit: &Visit| format!("{}-{}", visit.site, visit.id));
    let mut visit = Visit {
        id: 4,
        site: "NYC".to_string(),
        ..Visit::default()
    };
    assert_eq!(label.read(&visit).unwrap(), Value::Str("NYC-4".to_string()));
    assert!(matches!(
        label.write(&mut visit, Value::Str(String::new())),
        Err(ModelError::UnsupportedOperation {
            operation: Operation::Write,
            ..
        })
    ));
}

#[test]
fn record_and_row_defaults() {
    let schema = RecordSchema::new("Lab")
        .column("Code", ValueType::String)
        .column("Result", ValueType::nullable(ValueType::F64));
    let record = Record::new().with("Code", "HGB".to_string());
    let values: Vec<Value> = schema
        .members()
        .iter()
        .map(|m| m.read(&record).unwrap())
        .collect();
    assert_eq!(values, [Value::Str("HGB".to_string()), Value::Null]);

    let rows = RowSchema::new("Lab").column("Flag", ValueType::Bool);
    let row = Row::default();
    assert_eq!(rows.members()[0].read(&row).unwrap(), Value::Bool(false));
}

#[test]
fn record_serializes_as_map() {
    let record = Record::new().with("Id", 7_i32);
    let json = serde_json::to_string(&record).unwrap();
    assert_eq!(json, r#"{"values":{"Id":{"kind":"I32","value":7}}}"#);
    let round: Record = serde_json::from_str(&json).unwrap();
    assert_eq!(round, record);
}
