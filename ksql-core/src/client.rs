use crate::{
    CREATE_AS_RETRYABLE, ClientConfig, ColumnDef, CreateAsDef, CreateDef, Endpoint, KsqlSqlWriter,
    ObjectKind, QueryOptions, Request, Response, Result, RetryPolicy, SessionProperties,
    SqlWriter, StatementDef, StreamedRow, Transport, ValueFormat, decode_rows, interpret, validate,
};
use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use serde_json::Value;
use std::{pin::pin, time::Duration};

/// Submits statements to the engine through a [`Transport`].
///
/// Every call is independent: the client holds no mutable state and can be
/// shared by reference between tasks.
pub struct Client<T: Transport, W: SqlWriter = KsqlSqlWriter> {
    transport: T,
    config: ClientConfig,
    writer: W,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            writer: KsqlSqlWriter::new(),
        }
    }
}

impl<T: Transport, W: SqlWriter> Client<T, W> {
    /// Replace the writer used to build the statements of the `create_*` methods.
    pub fn with_sql_writer<W2: SqlWriter>(self, writer: W2) -> Client<T, W2> {
        Client {
            transport: self.transport,
            config: self.config,
            writer,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }
    pub fn transport(&self) -> &T {
        &self.transport
    }
    pub fn sql_writer(&self) -> &W {
        &self.writer
    }

    /// Policy guarding create-as submissions.
    pub fn create_as_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            CREATE_AS_RETRYABLE,
            self.config.delay(),
            self.config.max_retries(),
        )
    }

    async fn request(
        &self,
        endpoint: Endpoint,
        statement: String,
        properties: SessionProperties,
    ) -> Result<Response<T::Body>> {
        let statement = validate(statement)?;
        log::debug!(
            "Sending to `{}`:\n{}",
            self.config.endpoint_url(endpoint),
            statement
        );
        self.transport
            .send(Request::new(endpoint, statement, properties))
            .await
    }

    /// Submit a statement to `/ksql` and return the decoded document.
    ///
    /// Statuses other than 200 fail with [`KsqlError::Transport`](crate::KsqlError::Transport).
    pub async fn ksql(
        &self,
        statement: impl Into<String>,
        properties: SessionProperties,
    ) -> Result<Value> {
        self.request(Endpoint::Ksql, statement.into(), properties)
            .await?
            .json()
            .await
    }

    /// Run a query on `/query` and lazily stream its rows.
    ///
    /// Nothing is sent until the stream is first polled. Every call opens a
    /// new connection, released when the stream is dropped.
    pub fn query(
        &self,
        statement: impl Into<String>,
        properties: SessionProperties,
        options: QueryOptions,
    ) -> impl Stream<Item = Result<StreamedRow>> + Send {
        let statement = statement.into();
        try_stream! {
            let response = self.request(Endpoint::Query, statement, properties).await?;
            let mut rows = pin!(decode_rows(response.body, options));
            while let Some(row) = rows.try_next().await? {
                yield row;
            }
        }
    }

    /// Submit a statement to `/ksql` and interpret the command status.
    pub async fn execute(
        &self,
        statement: impl Into<String>,
        properties: SessionProperties,
    ) -> Result<bool> {
        let document = self.ksql(statement, properties).await?;
        interpret(&document)
    }

    /// `CREATE STREAM|TABLE ... WITH (...)`, submitted once.
    pub async fn create(&self, def: CreateDef) -> Result<bool> {
        let statement = self.writer.build(&StatementDef::Create(def));
        self.execute(statement, SessionProperties::new()).await
    }

    /// `CREATE STREAM|TABLE ... AS SELECT ...`, retried on timeouts and
    /// command failures according to [`Client::create_as_policy`].
    pub async fn create_as(&self, def: CreateAsDef) -> Result<bool> {
        let statement = self.writer.build(&StatementDef::CreateAs(def));
        self.create_as_policy()
            .run(|| self.execute(statement.clone(), SessionProperties::new()))
            .await
    }

    pub async fn create_stream<C: Into<ColumnDef>>(
        &self,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = C>,
        topic: impl Into<String>,
        value_format: ValueFormat,
    ) -> Result<bool> {
        self.create(
            CreateDef::new(ObjectKind::Stream, name, columns, topic)
                .with_value_format(value_format),
        )
        .await
    }

    pub async fn create_table<C: Into<ColumnDef>>(
        &self,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = C>,
        topic: impl Into<String>,
        value_format: ValueFormat,
    ) -> Result<bool> {
        self.create(
            CreateDef::new(ObjectKind::Table, name, columns, topic)
                .with_value_format(value_format),
        )
        .await
    }

    pub async fn create_stream_as(&self, mut def: CreateAsDef) -> Result<bool> {
        def.kind = ObjectKind::Stream;
        self.create_as(def).await
    }

    pub async fn create_table_as(&self, mut def: CreateAsDef) -> Result<bool> {
        def.kind = ObjectKind::Table;
        self.create_as(def).await
    }
}
