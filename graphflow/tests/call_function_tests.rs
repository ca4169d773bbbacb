//! Introspection and scan call functions through the public executor API

#[path = "testutils/mod.rs"]
mod testutils;

use graphflow::{BindError, BindInput, ExecutionError, LogicalType, Value};
use testutils::test_fixture::{TestFixture, NODE_TABLE, REL_TABLE};

fn strings(values: &[Value]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_db_version() {
    testutils::init_logging();
    let fixture = TestFixture::empty();
    let table = fixture.call("db_version", &BindInput::default()).unwrap();

    assert_eq!(table.columns.len(), 1);
    assert_eq!(table.columns[0].name, "version");
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].values[0], Value::from(graphflow::VERSION));
}

#[test]
fn test_current_setting_reflects_config() {
    let fixture = TestFixture::empty().with_threads(3);
    let table = fixture
        .call("current_setting", &BindInput::new(vec![Value::from("threads")]))
        .unwrap();

    assert_eq!(table.columns[0].name, "threads");
    assert_eq!(table.columns[0].data_type, LogicalType::Int64);
    assert_eq!(table.rows[0].values, vec![Value::Int64(3)]);
}

#[test]
fn test_current_setting_unknown_option() {
    let fixture = TestFixture::empty();
    let err = fixture
        .call("current_setting", &BindInput::new(vec![Value::from("no_such_option")]))
        .unwrap_err();
    assert_eq!(
        err,
        ExecutionError::Bind(BindError::UnknownSetting("no_such_option".to_string()))
    );
}

#[test]
fn test_show_tables() {
    let fixture = TestFixture::with_graph(3, &[]).with_threads(4);
    let table = fixture.call("show_tables", &BindInput::default()).unwrap();

    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["name", "type", "comment"]);

    let mut rows: Vec<Vec<String>> = table.rows.iter().map(|r| strings(&r.values)).collect();
    rows.sort();
    assert_eq!(
        rows,
        vec![
            vec![REL_TABLE.to_string(), "REL".to_string(), String::new()],
            vec![
                NODE_TABLE.to_string(),
                "NODE".to_string(),
                "people in the network".to_string()
            ],
        ]
    );
}

#[test]
fn test_show_tables_on_empty_catalog() {
    let fixture = TestFixture::empty().with_threads(2);
    let table = fixture.call("show_tables", &BindInput::default()).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.columns.len(), 3);
}

#[test]
fn test_table_info_for_node_table() {
    let fixture = TestFixture::with_graph(3, &[]);
    let table = fixture
        .call("table_info", &BindInput::new(vec![Value::from(NODE_TABLE)]))
        .unwrap();

    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["property id", "name", "type", "primary key"]);

    let mut rows: Vec<Vec<Value>> = table.rows.iter().map(|r| r.values.clone()).collect();
    rows.sort_by_key(|r| r[0].as_i64());
    assert_eq!(
        rows,
        vec![
            vec![Value::Int64(0), Value::from("id"), Value::from("INT64"), Value::Bool(true)],
            vec![Value::Int64(1), Value::from("name"), Value::from("STRING"), Value::Bool(false)],
        ]
    );
}

#[test]
fn test_table_info_for_rel_table_has_no_primary_key() {
    let fixture = TestFixture::with_graph(3, &[]);
    let table = fixture
        .call("table_info", &BindInput::new(vec![Value::from(REL_TABLE)]))
        .unwrap();

    assert_eq!(table.columns.len(), 3);
    assert_eq!(
        table.rows[0].values,
        vec![Value::Int64(0), Value::from("since"), Value::from("INT64")]
    );
}

#[test]
fn test_table_info_unknown_table() {
    let fixture = TestFixture::with_graph(3, &[]);
    let err = fixture
        .call("table_info", &BindInput::new(vec![Value::from("company")]))
        .unwrap_err();
    assert_eq!(err, ExecutionError::Bind(BindError::TableNotFound("company".to_string())));
}

#[test]
fn test_show_connection() {
    let fixture = TestFixture::with_graph(3, &[]);
    let table = fixture
        .call("show_connection", &BindInput::new(vec![Value::from(REL_TABLE)]))
        .unwrap();

    assert_eq!(table.columns[0].name, "source table name");
    assert_eq!(table.columns[1].name, "destination table name");
    assert_eq!(
        table.rows[0].values,
        vec![Value::from(NODE_TABLE), Value::from(NODE_TABLE)]
    );

    let err = fixture
        .call("show_connection", &BindInput::new(vec![Value::from(NODE_TABLE)]))
        .unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::Bind(BindError::InvalidTableType { .. })
    ));
}

#[test]
fn test_argument_errors_surface_at_bind() {
    let fixture = TestFixture::with_graph(3, &[]);

    assert!(matches!(
        fixture.prepare("show_tables", &BindInput::new(vec![Value::Int64(1)])),
        Err(ExecutionError::Bind(BindError::InvalidArgumentCount {
            expected: 0,
            actual: 1,
            ..
        }))
    ));
    assert!(matches!(
        fixture.prepare("table_info", &BindInput::new(vec![Value::Int64(1)])),
        Err(ExecutionError::Bind(BindError::InvalidArgumentType { .. }))
    ));
    assert!(matches!(
        fixture.prepare("db_version", &BindInput::default().with_option("verbose", true)),
        Err(ExecutionError::Bind(BindError::UnknownOption { .. }))
    ));
    assert!(matches!(
        fixture.prepare("betweenness", &BindInput::default()),
        Err(ExecutionError::Bind(BindError::UnknownFunction(_)))
    ));
}

#[test]
fn test_scan_nodes_row_offsets_are_a_permutation() {
    let num_nodes = 5_000u64;
    for threads in [1, 4, 16] {
        let fixture = TestFixture::with_graph(num_nodes, &[]).with_threads(threads);
        let table = fixture
            .call("scan_nodes", &BindInput::new(vec![Value::from(NODE_TABLE)]))
            .unwrap();
        assert_eq!(table.len(), num_nodes as usize);

        let mut row_offsets: Vec<u64> = table
            .rows
            .iter()
            .map(|r| r.row_offset.expect("scan rows carry a row offset"))
            .collect();
        row_offsets.sort_unstable();
        assert_eq!(row_offsets, (0..num_nodes).collect::<Vec<_>>());

        let mut nodes: Vec<u64> = table
            .rows
            .iter()
            .map(|r| r.values[0].as_node_offset().unwrap())
            .collect();
        nodes.sort_unstable();
        assert_eq!(nodes, (0..num_nodes).collect::<Vec<_>>());
    }
}

#[test]
fn test_scan_nodes_rejects_rel_table() {
    let fixture = TestFixture::with_graph(3, &[]);
    assert!(matches!(
        fixture.prepare("scan_nodes", &BindInput::new(vec![Value::from(REL_TABLE)])),
        Err(ExecutionError::Bind(BindError::InvalidTableType { .. }))
    ));
}

#[test]
fn test_introspection_rows_have_no_row_offsets() {
    let fixture = TestFixture::with_graph(3, &[]).with_threads(2);
    let table = fixture.call("show_tables", &BindInput::default()).unwrap();
    assert!(table.rows.iter().all(|r| r.row_offset.is_none()));
}
