use ksql::{Client, CreateAsDef, ErrorKind, SessionProperties, Transport, ValueFormat};

const SOURCE: &str = "KSQL_RS_PAGEVIEWS";
const DERIVED: &str = "KSQL_RS_PAGEVIEWS_USER1";

pub async fn streams<T: Transport>(client: &Client<T>) {
    // Setup
    for name in [DERIVED, SOURCE] {
        client
            .ksql(format!("DROP STREAM IF EXISTS {}", name), SessionProperties::new())
            .await
            .expect("Failed to drop the stream");
    }

    let created = client
        .create_stream(
            SOURCE,
            [
                ("viewtime", "BIGINT"),
                ("userid", "VARCHAR"),
                ("pageid", "VARCHAR"),
            ],
            "ksql_rs_pageviews",
            ValueFormat::Json,
        )
        .await
        .expect("Failed to create the source stream");
    assert!(created);

    let created = client
        .create_stream_as(
            CreateAsDef::stream(DERIVED, SOURCE)
                .with_select_columns(["viewtime", "pageid"])
                .with_conditions(["userid = 'User_1'"]),
        )
        .await
        .expect("Failed to create the derived stream");
    assert!(created);

    let listed = client
        .ksql("SHOW STREAMS", SessionProperties::new())
        .await
        .expect("Failed to list the streams");
    let listed = listed.to_string();
    assert!(listed.contains(SOURCE), "{} not in {}", SOURCE, listed);
    assert!(listed.contains(DERIVED), "{} not in {}", DERIVED, listed);

    // A source that does not exist is rejected by the engine
    let error = client
        .create_stream_as(CreateAsDef::stream("KSQL_RS_NOWHERE", "KSQL_RS_MISSING_SOURCE"))
        .await
        .expect_err("Creating from a missing source should fail");
    assert!(matches!(
        ErrorKind::of(&error),
        Some(ErrorKind::Create | ErrorKind::Transport)
    ));
}
