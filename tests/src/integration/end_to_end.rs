//! # End-to-End Correlation
//!
//! Event collections in, CSV tables out:
//!
//! 1. **In-memory source**: correlation → aggregation → table writer
//! 2. **JSON export**: `indexer_runtime::run` over files in a temp directory
//!
//! Covers the single-chain lifecycle, integer id matching across textual
//! forms, schema fallback and the decode-failure marker.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use cl_01_claim_decoding::{ClaimData, ClaimSchema};
    use cl_02_correlation::{CertificateRowId, CorrelationService};
    use cl_04_reporting::{aggregate, Table, TableWriter};
    use indexer_runtime::{run, IndexerConfig};
    use shared_types::tabular::parse_records;
    use shared_types::{
        Address, Bytes, CertificateBatchMintedArgs, ClaimSingleArgs, EventKind,
        InMemoryEventSource, RawEvent, RedemptionSetArgs, TransferSingleArgs, TxHash, U256, U512,
    };
    use tempfile::TempDir;
    use uuid::Uuid;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const OPERATOR: [u8; 20] = [0x0e; 20];
    const HOLDER: [u8; 20] = [0x70; 20];

    fn redemption(batch: &str) -> RedemptionSetArgs {
        RedemptionSetArgs {
            batch_id: batch.into(),
            redemption_statement: format!("statement for {batch}"),
            storage_pointer: format!("ipfs://{batch}"),
        }
    }

    fn batch_minted(batch: &str, ids: &[u64]) -> CertificateBatchMintedArgs {
        CertificateBatchMintedArgs {
            batch_id: batch.into(),
            certificate_ids: ids.iter().copied().map(U256::from).collect(),
        }
    }

    fn mint(id: u64, value: u64) -> TransferSingleArgs {
        TransferSingleArgs {
            operator: Address::new(OPERATOR),
            from: Address::ZERO,
            to: Address::new(HOLDER),
            id: U256::from(id),
            value: U256::from(value),
        }
    }

    fn claim(id: u64, value: u64, claim_data: Vec<u8>) -> ClaimSingleArgs {
        ClaimSingleArgs {
            claim_issuer: Address::new(HOLDER),
            claim_subject: Address::new([0x5b; 20]),
            topic: U256::from(1),
            id: U256::from(id),
            value: U256::from(value),
            claim_data: Bytes::from(claim_data),
        }
    }

    fn acme() -> ClaimData {
        ClaimData {
            beneficiary: "Acme GmbH".into(),
            region: "Bavaria".into(),
            country_code: "DE".into(),
            period_start_date: "2024-01-01".into(),
            period_end_date: "2024-12-31".into(),
            purpose: "scope 2".into(),
            consumption_entity_id: "site-4".into(),
            proof_id: "p-99".into(),
            ..ClaimData::default()
        }
    }

    /// Batch B1 with certificate 7 minted for 1000 and claimed for 400.
    fn single_chain(claim_data: Vec<u8>) -> InMemoryEventSource {
        InMemoryEventSource::new()
            .with_event(10, TxHash::new([1; 32]), redemption("B1"))
            .with_event(11, TxHash::new([2; 32]), batch_minted("B1", &[7]))
            .with_event(12, TxHash::new([3; 32]), mint(7, 1000))
            .with_event(13, TxHash::new([4; 32]), claim(7, 400, claim_data))
    }

    fn read_table(path: &Path) -> Vec<Vec<String>> {
        parse_records(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn raw(block: u64, tx: u8, args: impl Into<shared_types::EventArgs>) -> RawEvent {
        RawEvent {
            block_number: block,
            log_index: 0,
            transaction_hash: TxHash::new([tx; 32]),
            args: args.into(),
        }
    }

    fn write_export(dir: &Path, kind: EventKind, events: &[RawEvent]) {
        fs::write(
            dir.join(format!("{}.json", kind.as_str())),
            serde_json::to_string_pretty(events).unwrap(),
        )
        .unwrap();
    }

    // =============================================================================
    // IN-MEMORY SOURCE
    // =============================================================================

    #[tokio::test]
    async fn test_single_chain_produces_linked_rows_and_totals() {
        let dir = TempDir::new().unwrap();
        let payload = ClaimSchema::V3.encode(&acme());
        let service = CorrelationService::new(Arc::new(single_chain(payload)));

        let output = service.run(Uuid::new_v4()).await.unwrap();

        assert_eq!(output.batches.len(), 1);
        assert_eq!(output.certificates.len(), 1);
        assert_eq!(output.claims.len(), 1);
        assert_eq!(output.batches[0].certificate_ids, vec![CertificateRowId(0)]);
        assert_eq!(output.certificates[0].batch_id, "B1");
        assert_eq!(output.claims[0].certificate_id, CertificateRowId(0));
        assert_eq!(output.claims[0].claim_data_decoded.schema(), Some(ClaimSchema::V3));
        assert_eq!(output.claims[0].claim_data_decoded.data(), Some(&acme()));

        let totals = aggregate(&output.certificates, &output.claims);
        assert_eq!(totals.minted, U512::from(1000));
        assert_eq!(totals.claimed, U512::from(400));
        assert_eq!(totals.outstanding(), Some(U512::from(600)));

        let writer = TableWriter::new(dir.path());
        assert!(writer.write_all(&output, None).iter().all(Result::is_ok));

        let batches = read_table(&writer.path_of(Table::Batches));
        assert_eq!(batches[1][0], "B1");
        assert_eq!(batches[1][3], "[0]");
        assert_eq!(batches[1][5], "10");

        let certificates = read_table(&writer.path_of(Table::Certificates));
        assert_eq!(certificates[1][1], "7");
        assert_eq!(certificates[1][3], "1000");
        assert_eq!(certificates[1][9], "[0]");

        let claims = read_table(&writer.path_of(Table::Claims));
        assert_eq!(claims[1][2], "0");
        assert_eq!(claims[1][6], "400");
        let decoded: serde_json::Value = serde_json::from_str(&claims[1][8]).unwrap();
        assert_eq!(decoded["beneficiary"], "Acme GmbH");
        assert_eq!(decoded["countryCode"], "DE");
        assert_eq!(decoded["proofID"], "p-99");
        assert_eq!(decoded["consumptionEntityID"], "site-4");
    }

    #[tokio::test]
    async fn test_undecodable_payload_keeps_claim_row() {
        let dir = TempDir::new().unwrap();
        let service = CorrelationService::new(Arc::new(single_chain(vec![0xde, 0xad, 0xbe, 0xef])));

        let output = service.run(Uuid::new_v4()).await.unwrap();

        assert_eq!(output.claims.len(), 1);
        assert!(!output.claims[0].claim_data_decoded.is_decoded());
        assert_eq!(output.stats.decode_failures, 1);
        assert_eq!(output.stats.claims_decoded, 0);

        let writer = TableWriter::new(dir.path());
        writer.write_table(&output.claims).unwrap();
        let claims = read_table(&writer.path_of(Table::Claims));
        assert_eq!(claims[1][7], "0xdeadbeef");
        assert_eq!(claims[1][8], "null");
    }

    #[tokio::test]
    async fn test_v1_payload_decodes_as_v1() {
        let payload = ClaimSchema::V1.encode(&ClaimData {
            beneficiary: "Acme GmbH".into(),
            location: "Munich".into(),
            country_code: "DE".into(),
            ..ClaimData::default()
        });
        let service = CorrelationService::new(Arc::new(single_chain(payload)));

        let output = service.run(Uuid::new_v4()).await.unwrap();

        let decoded = &output.claims[0].claim_data_decoded;
        assert_eq!(decoded.schema(), Some(ClaimSchema::V1));
        assert_eq!(decoded.data().map(|d| d.location.as_str()), Some("Munich"));
        assert_eq!(decoded.data().map(|d| d.region.as_str()), Some(""));
        assert_eq!(output.stats.decoded_v1, 1);
        assert_eq!(output.stats.decoded_v3, 0);
    }

    #[tokio::test]
    async fn test_v2_embedded_json_decodes_as_v2() {
        let service = CorrelationService::new(Arc::new(single_chain(ClaimSchema::V2.encode(&acme()))));

        let output = service.run(Uuid::new_v4()).await.unwrap();

        assert_eq!(output.claims[0].claim_data_decoded.schema(), Some(ClaimSchema::V2));
        assert_eq!(output.stats.decoded_v2, 1);
    }

    #[tokio::test]
    async fn test_unminted_and_unclaimed_ids_emit_nothing_extra() {
        let source = InMemoryEventSource::new()
            .with_event(1, TxHash::new([1; 32]), redemption("B1"))
            .with_event(2, TxHash::new([2; 32]), batch_minted("B1", &[7, 8]))
            .with_event(3, TxHash::new([3; 32]), mint(7, 10))
            .with_event(4, TxHash::new([4; 32]), claim(9, 5, vec![]))
            .with_event(5, TxHash::new([5; 32]), batch_minted("B2", &[7]));

        let output = CorrelationService::new(Arc::new(source)).run(Uuid::new_v4()).await.unwrap();

        assert_eq!(output.batches.len(), 1);
        assert_eq!(output.certificates.len(), 1);
        assert!(output.claims.is_empty());
        assert!(output.certificates[0].claim_ids.is_empty());
        assert_eq!(output.stats.orphan_batch_minted, 1);
    }

    // =============================================================================
    // JSON EXPORT
    // =============================================================================

    #[tokio::test]
    async fn test_json_export_run_writes_tables() {
        let dir = TempDir::new().unwrap();
        let events = dir.path().join("events");
        fs::create_dir_all(&events).unwrap();
        write_export(&events, EventKind::RedemptionSet, &[raw(10, 1, redemption("B1"))]);
        write_export(
            &events,
            EventKind::CertificateBatchMinted,
            &[raw(11, 2, batch_minted("B1", &[7]))],
        );
        write_export(
            &events,
            EventKind::TransferSingle,
            &[raw(12, 3, mint(7, 1000))],
        );
        write_export(
            &events,
            EventKind::ClaimSingle,
            &[raw(13, 4, claim(7, 400, ClaimSchema::V3.encode(&acme())))],
        );

        let mut config = IndexerConfig::default();
        config.source.events_dir = events;
        config.output.output_dir = dir.path().join("out");
        config.validate().unwrap();

        let summary = run(&config).await.unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.totals.minted, U512::from(1000));
        assert_eq!(summary.totals.claimed, U512::from(400));
        assert_eq!(summary.correlation.decoded_v3, 1);
        for table in ["batches.csv", "certificates.csv", "claims.csv", "metrics.prom"] {
            assert!(config.output.output_dir.join(table).is_file(), "{table} missing");
        }
    }

    #[tokio::test]
    async fn test_padded_and_hex_ids_match_as_integers() {
        let dir = TempDir::new().unwrap();
        let tx = format!("0x{}", "ab".repeat(32));
        let zero = Address::ZERO.to_string();
        let holder = Address::new(HOLDER).to_string();
        let files = [
            (
                "RedemptionSet",
                format!(
                    r#"[{{"blockNumber": 1, "transactionHash": "{tx}",
                         "args": {{"event": "RedemptionSet", "batchId": 1,
                                  "redemptionStatement": "s", "storagePointer": "p"}}}}]"#
                ),
            ),
            (
                "CertificateBatchMinted",
                format!(
                    r#"[{{"blockNumber": 2, "transactionHash": "{tx}",
                         "args": {{"event": "CertificateBatchMinted", "batchId": "1",
                                  "certificateIds": ["007"]}}}}]"#
                ),
            ),
            (
                "TransferSingle",
                format!(
                    r#"[{{"blockNumber": 3, "transactionHash": "{tx}",
                         "args": {{"event": "TransferSingle", "operator": "{holder}",
                                  "from": "{zero}", "to": "{holder}", "id": "0x07", "value": "1000"}}}}]"#
                ),
            ),
            (
                "ClaimSingle",
                format!(
                    r#"[{{"blockNumber": 4, "transactionHash": "{tx}",
                         "args": {{"event": "ClaimSingle", "claimIssuer": "{holder}",
                                  "claimSubject": "{holder}", "topic": 1, "id": 7,
                                  "value": "400", "claimData": "0x"}}}}]"#
                ),
            ),
        ];
        for (kind, body) in &files {
            fs::write(dir.path().join(format!("{kind}.json")), body).unwrap();
        }

        let mut config = IndexerConfig::default();
        config.source.events_dir = dir.path().to_path_buf();
        config.output.output_dir = dir.path().join("out");

        let summary = run(&config).await.unwrap();

        assert_eq!(summary.correlation.batches, 1);
        assert_eq!(summary.correlation.certificates, 1);
        assert_eq!(summary.correlation.claims, 1);
        assert_eq!(summary.correlation.decode_failures, 1);

        let certificates = read_table(&config.output.output_dir.join("certificates.csv"));
        assert_eq!(certificates[1][1], "7");
        assert_eq!(certificates[1][2], "1");

        let claims = read_table(&config.output.output_dir.join("claims.csv"));
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[1][1], "7");
        assert_eq!(claims[1][2], "0");
    }

    #[tokio::test]
    async fn test_missing_export_aborts_run() {
        let dir = TempDir::new().unwrap();
        write_export(dir.path(), EventKind::RedemptionSet, &[]);

        let mut config = IndexerConfig::default();
        config.source.events_dir = dir.path().to_path_buf();
        config.output.output_dir = dir.path().join("out");

        let err = run(&config).await.unwrap_err();

        assert!(format!("{err:#}").contains("source unavailable"));
        assert!(!config.output.output_dir.exists());
    }
}
