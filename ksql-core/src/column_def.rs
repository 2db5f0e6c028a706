use std::{
    borrow::Cow,
    fmt::{self, Display},
};

/// Whether a statement creates a stream or a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    #[default]
    Stream,
    Table,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Stream => "STREAM",
            ObjectKind::Table => "TABLE",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialization of the values of the backing topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValueFormat {
    #[default]
    Json,
    Delimited,
    Avro,
    Protobuf,
    Kafka,
}

impl ValueFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueFormat::Json => "JSON",
            ValueFormat::Delimited => "DELIMITED",
            ValueFormat::Avro => "AVRO",
            ValueFormat::Protobuf => "PROTOBUF",
            ValueFormat::Kafka => "KAFKA",
        }
    }
}

impl Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of a created stream or table, `column_type` is written as is.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: Cow<'static, str>,
    pub column_type: Cow<'static, str>,
}

impl ColumnDef {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        column_type: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<N, T> From<(N, T)> for ColumnDef
where
    N: Into<Cow<'static, str>>,
    T: Into<Cow<'static, str>>,
{
    fn from((name, column_type): (N, T)) -> Self {
        ColumnDef::new(name, column_type)
    }
}

/// Parameters of `CREATE STREAM|TABLE name (columns) WITH (...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDef {
    pub kind: ObjectKind,
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub topic: String,
    pub value_format: ValueFormat,
}

impl CreateDef {
    pub fn new(
        kind: ObjectKind,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<ColumnDef>>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            topic: topic.into(),
            value_format: ValueFormat::Json,
        }
    }
    pub fn with_value_format(mut self, value_format: ValueFormat) -> Self {
        self.value_format = value_format;
        self
    }
}

/// Parameters of `CREATE STREAM|TABLE name AS SELECT ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAsDef {
    pub kind: ObjectKind,
    pub name: String,
    /// Selected expressions, all columns when empty.
    pub select_columns: Vec<String>,
    pub source: String,
    pub topic: Option<String>,
    pub value_format: ValueFormat,
    /// Joined with `AND` in the `WHERE` clause.
    pub conditions: Vec<String>,
    pub partition_by: Option<String>,
}

impl CreateAsDef {
    pub fn new(kind: ObjectKind, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            select_columns: Vec::new(),
            source: source.into(),
            topic: None,
            value_format: ValueFormat::Json,
            conditions: Vec::new(),
            partition_by: None,
        }
    }
    pub fn stream(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(ObjectKind::Stream, name, source)
    }
    pub fn table(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(ObjectKind::Table, name, source)
    }
    pub fn with_select_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.select_columns = columns.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
    pub fn with_value_format(mut self, value_format: ValueFormat) -> Self {
        self.value_format = value_format;
        self
    }
    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }
    pub fn with_partition_by(mut self, key: impl Into<String>) -> Self {
        self.partition_by = Some(key.into());
        self
    }
}

/// Statements the writer knows how to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementDef {
    Create(CreateDef),
    CreateAs(CreateAsDef),
}

impl From<CreateDef> for StatementDef {
    fn from(value: CreateDef) -> Self {
        StatementDef::Create(value)
    }
}

impl From<CreateAsDef> for StatementDef {
    fn from(value: CreateAsDef) -> Self {
        StatementDef::CreateAs(value)
    }
}
