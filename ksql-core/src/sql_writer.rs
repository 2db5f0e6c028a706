use crate::{ColumnDef, CreateAsDef, CreateDef, StatementDef, ValueFormat, separated_by};

/// Builds the text of the statements sent by the convenience methods of
/// [`Client`](crate::Client).
///
/// Every method has a default implementation producing KSQL, override the
/// fragments a server dialect writes differently.
pub trait SqlWriter: Send + Sync {
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    fn write_column_def(&self, out: &mut String, column: &ColumnDef) {
        self.write_identifier(out, column.name());
        out.push(' ');
        out.push_str(&column.column_type);
    }

    /// `WITH (kafka_topic='...', value_format='...')`, omitted when both are absent.
    fn write_with_clause(
        &self,
        out: &mut String,
        topic: Option<&str>,
        value_format: Option<ValueFormat>,
    ) {
        if topic.is_none() && value_format.is_none() {
            return;
        }
        out.push_str(" WITH (");
        let mut written = false;
        if let Some(topic) = topic {
            out.push_str("kafka_topic=");
            self.write_value_string(out, topic);
            written = true;
        }
        if let Some(value_format) = value_format {
            if written {
                out.push_str(", ");
            }
            out.push_str("value_format=");
            self.write_value_string(out, value_format.as_str());
        }
        out.push(')');
    }

    fn write_create(&self, out: &mut String, def: &CreateDef) {
        out.push_str("CREATE ");
        out.push_str(def.kind.as_str());
        out.push(' ');
        self.write_identifier(out, &def.name);
        out.push_str(" (");
        separated_by(
            out,
            &def.columns,
            |out, v| self.write_column_def(out, v),
            ", ",
        );
        out.push(')');
        self.write_with_clause(out, Some(&def.topic), Some(def.value_format));
        out.push(';');
    }

    fn write_create_as(&self, out: &mut String, def: &CreateAsDef) {
        out.push_str("CREATE ");
        out.push_str(def.kind.as_str());
        out.push(' ');
        self.write_identifier(out, &def.name);
        self.write_with_clause(out, def.topic.as_deref(), Some(def.value_format));
        out.push_str(" AS SELECT ");
        if def.select_columns.is_empty() {
            out.push('*');
        } else {
            separated_by(out, &def.select_columns, |out, v| out.push_str(v), ", ");
        }
        out.push_str(" FROM ");
        self.write_identifier(out, &def.source);
        if !def.conditions.is_empty() {
            out.push_str(" WHERE ");
            separated_by(out, &def.conditions, |out, v| out.push_str(v), " AND ");
        }
        if let Some(key) = &def.partition_by {
            out.push_str(" PARTITION BY ");
            self.write_identifier(out, key);
        }
        out.push(';');
    }

    /// Text of `def`.
    fn build(&self, def: &StatementDef) -> String {
        let mut out = String::with_capacity(128);
        match def {
            StatementDef::Create(def) => self.write_create(&mut out, def),
            StatementDef::CreateAs(def) => self.write_create_as(&mut out, def),
        }
        out
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KsqlSqlWriter;

impl KsqlSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for KsqlSqlWriter {}
