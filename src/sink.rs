use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use log::debug;
use mongodb::{
    bson::{self, Bson, DateTime as BsonDateTime, Document},
    sync::{Client, Collection},
};

use crate::{
    data::{Record, Value},
    io_utils,
};

/// Destination for normalized records.
pub trait RecordSink {
    fn store(&mut self, record: &Record) -> Result<()>;

    /// Called once after the last record has been stored.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl RecordSink for Vec<Record> {
    fn store(&mut self, record: &Record) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Inserts each record as one document into a MongoDB collection.
pub struct MongoSink {
    collection: Collection<Document>,
}

impl MongoSink {
    pub fn connect(connection_string: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(connection_string)
            .context("Connecting to MongoDB")?;
        debug!("Using collection '{collection}' in database '{database}'");
        Ok(Self {
            collection: client.database(database).collection::<Document>(collection),
        })
    }
}

impl RecordSink for MongoSink {
    fn store(&mut self, record: &Record) -> Result<()> {
        let document = to_document(record)?;
        self.collection
            .insert_one(document, None)
            .with_context(|| format!("Inserting into collection '{}'", self.collection.name()))?;
        Ok(())
    }
}

/// Converts a record into a BSON document, keeping field order.
///
/// Naive date-times are stored with their wall-clock value as UTC.
pub fn to_document(record: &Record) -> Result<Document> {
    let mut document = Document::new();
    for (key, value) in record.iter() {
        document.insert(key, to_bson(value).with_context(|| format!("Converting field '{key}'"))?);
    }
    Ok(document)
}

fn to_bson(value: &Value) -> Result<Bson> {
    let converted = match value {
        Value::Null => Bson::Null,
        Value::Integer(i) => Bson::Int64(*i),
        Value::Float(f) => Bson::Double(*f),
        Value::Text(s) => Bson::String(s.clone()),
        Value::DateTime(dt) => {
            Bson::DateTime(BsonDateTime::from_millis(dt.and_utc().timestamp_millis()))
        }
        Value::Json(json) => bson::to_bson(json)?,
    };
    Ok(converted)
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<Box<dyn Write>> {
    /// Opens `path` for writing, or stdout when absent or `-`.
    pub fn create(path: Option<&Path>) -> Result<Self> {
        let writer: Box<dyn Write> = match path {
            Some(p) if !io_utils::is_dash(p) => Box::new(BufWriter::new(
                File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
            )),
            _ => Box::new(std::io::stdout()),
        };
        Ok(Self::new(writer))
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn store(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record).context("Serializing record")?;
        self.writer.write_all(b"\n").context("Writing record")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Flushing output writer")
    }
}
