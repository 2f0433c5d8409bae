//! # Database Generation
//!
//! Issues a signed credential for every supported record of the input
//! database and adds it to the record, together with the holder's private
//! key and the credential's display metadata.

use std::fs;
use std::path::Path;

use anyhow::Context;
use base64ct::{Base64Url, Encoding};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use testdata_claims::{build_disclosure_claims, display_claims, ClaimTree};
use testdata_infosec::{DeviceKey, IssuerKey};
use testdata_iso_mdl::MdocIssuer;
use testdata_sd_jwt::SdJwtIssuer;
use tracing::{info, instrument, trace, warn};

use crate::config::Config;
use crate::database::{self, Database, MdocCredential, Record, DC_SD_JWT, MSO_MDOC};

/// Read the input database, issue its credentials and write the output
/// database.
///
/// Nothing is written unless every record was processed.
///
/// # Errors
///
/// Returns an error if the issuer key or input cannot be loaded, any record
/// cannot be issued, or the output cannot be written.
#[instrument(level = "info", skip_all, fields(input = %config.input.display()))]
pub fn generate(config: &Config) -> anyhow::Result<()> {
    let issuer_key = IssuerKey::load(&config.certificate, &config.private_key)?;

    let input = fs::read_to_string(&config.input)
        .with_context(|| format!("issue reading database {}", config.input.display()))?;
    let database: Database = serde_json::from_str(&input)
        .with_context(|| format!("issue parsing database {}", config.input.display()))?;

    let database = Generator::new(issuer_key, config).process(database)?;
    write_database(&config.output, &database)?;
    info!(credentials = database.len(), output = %config.output.display(), "wrote database");

    Ok(())
}

/// Issues credentials for database records.
#[derive(Debug)]
pub struct Generator {
    mdoc: MdocIssuer<IssuerKey>,
    sd_jwt: SdJwtIssuer<IssuerKey>,
    rng: StdRng,
    issued_at: DateTime<Utc>,
}

impl Generator {
    /// Create a generator signing with `issuer_key`.
    #[must_use]
    pub fn new(issuer_key: IssuerKey, config: &Config) -> Self {
        let randomness = config.randomness();

        Self {
            mdoc: MdocIssuer::new(issuer_key.clone(), randomness.stream(1), config.validity()),
            sd_jwt: SdJwtIssuer::new(issuer_key, config.issuer.clone(), randomness.stream(2)),
            rng: randomness.rng(),
            issued_at: config.issued_at.unwrap_or_else(Utc::now),
        }
    }

    /// Process every record of `database`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first record that cannot be processed.
    pub fn process(&mut self, database: Database) -> anyhow::Result<Database> {
        let mut processed = Database::with_capacity(database.len());
        for (id, record) in database {
            let record = self
                .process_record(&id, record)
                .with_context(|| format!("issue processing credential `{id}`"))?;
            processed.insert(id, record);
        }
        Ok(processed)
    }

    /// Issue the credential described by `record`, returning the record with
    /// the issued fields added. Records of other formats are returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no `format`, lacks the fields its
    /// format needs, or the credential cannot be issued.
    #[instrument(level = "debug", skip(self, record))]
    pub fn process_record(&mut self, id: &str, mut record: Record) -> anyhow::Result<Record> {
        let format = database::format(&record)?.to_owned();
        match format.as_str() {
            MSO_MDOC => self.issue_mdoc(&mut record)?,
            DC_SD_JWT => self.issue_sd_jwt(&mut record)?,
            _ => {
                warn!(id, format = %format, "unsupported format, record left unchanged");
                return Ok(record);
            }
        }
        info!(id, format = %format, "issued credential");

        Ok(record)
    }

    fn issue_mdoc(&mut self, record: &mut Record) -> anyhow::Result<()> {
        let credential: MdocCredential = database::field(record, "credential")?;
        let dataset = credential.dataset()?;

        let device_key = DeviceKey::generate(&mut self.rng)?;
        let issuer_signed =
            self.mdoc.issue(&credential.doc_type, &dataset, &device_key.cose_key(), self.issued_at)?;

        record.insert(String::from("issuerSigned"), Value::String(Base64Url::encode_string(&issuer_signed)));
        record.insert(String::from("deviceKey"), Value::String(device_key.to_pkcs8_base64url()?));
        record.insert(String::from("claims"), serde_json::to_value(display_claims(&credential.name_spaces))?);

        Ok(())
    }

    fn issue_sd_jwt(&mut self, record: &mut Record) -> anyhow::Result<()> {
        let vct: String = database::field(record, "vct")?;
        let paths: ClaimTree = database::field(record, "paths")?;

        let claims = build_disclosure_claims(&paths);
        trace!(vct = %vct, claims = %claims.to_plain_value(), "disclosure claims");

        let device_key = DeviceKey::generate(&mut self.rng)?;
        let sd_jwt = self.sd_jwt.issue(&claims, &vct, &device_key.public_jwk(), self.issued_at)?;

        record.insert(String::from("credential"), Value::String(sd_jwt.to_string()));
        record.insert(String::from("deviceKey"), Value::String(device_key.to_pkcs8_base64url()?));
        record.insert(String::from("claims"), serde_json::to_value(display_claims(&paths))?);

        Ok(())
    }
}

/// Serialize `database` as JSON indented by four spaces.
///
/// # Errors
///
/// Returns an error if the database cannot be serialized.
pub fn to_pretty_json(database: &Database) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    database.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

fn write_database(path: &Path, database: &Database) -> anyhow::Result<()> {
    let json = to_pretty_json(database)?;
    fs::write(path, json).with_context(|| format!("issue writing database {}", path.display()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;
    use test_utils::{ISSUER_CERT, ISSUER_KEY};

    use super::*;

    fn generator(seed: u64) -> Generator {
        test_utils::init_tracer();
        let key = IssuerKey::from_pem(ISSUER_CERT, ISSUER_KEY).expect("should load");
        let config = Config {
            seed: Some(seed),
            issued_at: Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).single(),
            ..Config::default()
        };
        Generator::new(key, &config)
    }

    fn record(value: Value) -> Record {
        serde_json::from_value(value).expect("should be an object")
    }

    #[test]
    fn unsupported_format() {
        let input = record(json!({"format": "dc-authorization+sd-jwt", "vct": "phone"}));
        let output = generator(1).process_record("phone", input.clone()).expect("should pass through");
        assert_eq!(output, input);
    }

    #[test]
    fn missing_format() {
        let err = generator(1).process_record("bad", record(json!({"vct": "x"}))).expect_err("should fail");
        assert_eq!(err.to_string(), "record has no `format`");
    }

    #[test]
    fn sd_jwt_record() {
        let input = record(json!({
            "format": "dc+sd-jwt",
            "vct": "urn:eudi:pid:1",
            "paths": {
                "given_name": {"value": "Erika", "display": "Given Name", "_sd": true},
                "nationality": {"value": "DE"}
            }
        }));
        let output = generator(2).process_record("pid", input).expect("should issue");

        assert_eq!(
            output.keys().collect::<Vec<_>>(),
            ["format", "vct", "paths", "credential", "deviceKey", "claims"]
        );
        let credential = output["credential"].as_str().expect("should be a string");
        assert_eq!(credential.matches('~').count(), 2);
        assert_eq!(
            output["claims"],
            json!([{"path": ["given_name"], "display": [{"locale": "en-US", "name": "Given Name"}]}])
        );
    }

    #[test]
    fn mdoc_record() {
        let input = record(json!({
            "format": "mso_mdoc",
            "credential": {
                "docType": "org.iso.18013.5.1.mDL",
                "nameSpaces": {
                    "org.iso.18013.5.1": {
                        "family_name": {"value": "Mustermann", "display": "Family Name"},
                        "portrait_capture_date": {"value": "2020-01-01"}
                    }
                }
            }
        }));
        let output = generator(3).process_record("mdl", input).expect("should issue");

        assert_eq!(
            output.keys().collect::<Vec<_>>(),
            ["format", "credential", "issuerSigned", "deviceKey", "claims"]
        );
        let issuer_signed = output["issuerSigned"].as_str().expect("should be a string");
        assert!(Base64Url::decode_vec(issuer_signed).is_ok());
        assert_eq!(
            output["claims"],
            json!([{
                "path": ["org.iso.18013.5.1", "family_name"],
                "display": [{"locale": "en-US", "name": "Family Name"}]
            }])
        );
    }

    #[test]
    fn malformed_record_names_credential() {
        let mut database = Database::new();
        database.insert(String::from("ok"), record(json!({"format": "other"})));
        database.insert(
            String::from("broken"),
            record(json!({"format": "dc+sd-jwt", "vct": "x", "paths": {"name": "flat"}})),
        );

        let err = generator(4).process(database).expect_err("should fail");
        assert_eq!(err.to_string(), "issue processing credential `broken`");
    }

    #[test]
    fn four_space_indent() {
        let mut database = Database::new();
        database.insert(String::from("phone"), record(json!({"format": "other"})));

        let json = to_pretty_json(&database).expect("should serialize");
        assert_eq!(json, "{\n    \"phone\": {\n        \"format\": \"other\"\n    }\n}");
    }
}
