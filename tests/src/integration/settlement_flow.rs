//! # Settlement Flow
//!
//! Agreement events reconciled through the append-only cache artifact
//! across consecutive runs of the indexer.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use cl_03_settlement::{AgreementData, AgreementDataAccessor, InMemoryAgreementAccessor, CACHE_HEADER};
    use indexer_runtime::{run_with_source, IndexerConfig};
    use shared_types::tabular::{format_record, parse_records};
    use shared_types::{
        Address, AgreementClaimedArgs, AgreementDeployedArgs, AgreementFilledArgs,
        AgreementSignedArgs, EventSource, InMemoryEventSource, TxHash, U256,
    };
    use tempfile::TempDir;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const BUYER: [u8; 20] = [0xb0; 20];
    const SELLER: [u8; 20] = [0x5e; 20];

    fn agreement(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn data(amount: u64, valid: bool) -> AgreementData {
        AgreementData {
            buyer: Address::new(BUYER),
            seller: Address::new(SELLER),
            amount: U256::from(amount),
            metadata: r#"{"kind":"ppa"}"#.into(),
            valid,
        }
    }

    /// Agreement `n` deployed at block `n`, signed for `signed`, filled for `filled`.
    fn lifecycle(source: InMemoryEventSource, n: u8, signed: u64, filled: u64) -> InMemoryEventSource {
        let block = u64::from(n);
        source
            .with_event(block, TxHash::new([n; 32]), AgreementDeployedArgs { agreement: agreement(n) })
            .with_event(
                block + 100,
                TxHash::new([n.wrapping_add(0x40); 32]),
                AgreementSignedArgs {
                    agreement: agreement(n),
                    signer: Address::new(BUYER),
                    amount: U256::from(signed),
                },
            )
            .with_event(
                block + 200,
                TxHash::new([n.wrapping_add(0x80); 32]),
                AgreementFilledArgs {
                    agreement: agreement(n),
                    certificate_id: U256::from(7),
                    amount: U256::from(filled),
                },
            )
            .with_event(
                block + 300,
                TxHash::new([n.wrapping_add(0xc0); 32]),
                AgreementClaimedArgs {
                    agreement: agreement(n),
                    certificate_id: U256::from(7),
                    amount: U256::from(filled),
                },
            )
    }

    fn config(dir: &TempDir) -> IndexerConfig {
        let mut config = IndexerConfig::default();
        config.source.events_dir = dir.path().to_path_buf();
        config.output.output_dir = dir.path().join("out");
        config.settlement.enabled = true;
        config.settlement.cache_path = dir.path().join("cache").join("agreement-cache.csv");
        config
    }

    fn read(path: &std::path::Path) -> Vec<Vec<String>> {
        parse_records(&fs::read_to_string(path).unwrap()).unwrap()
    }

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_preseeded_cache_avoids_accessor() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let cached = data(5000, true);
        fs::create_dir_all(config.settlement.cache_path.parent().unwrap()).unwrap();
        fs::write(
            &config.settlement.cache_path,
            format!(
                "{}\n{}\n",
                format_record(&CACHE_HEADER),
                format_record(&[
                    "3".to_string(),
                    agreement(3).to_string(),
                    cached.buyer.to_string(),
                    cached.seller.to_string(),
                    cached.amount.to_string(),
                    cached.metadata.clone(),
                    "true".to_string(),
                ])
            ),
        )
        .unwrap();
        let source: Arc<dyn EventSource> = Arc::new(lifecycle(InMemoryEventSource::new(), 3, 5000, 5000));
        // Empty accessor: any lookup would fail the run.
        let accessor = Arc::new(InMemoryAgreementAccessor::new());

        let summary = run_with_source(&config, source, Some(accessor.clone() as Arc<dyn AgreementDataAccessor>))
            .await
            .unwrap();

        assert!(summary.is_success());
        let stats = summary.settlement.unwrap();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.accessor_calls, 0);
        assert_eq!(accessor.total_calls(), 0);
        assert_eq!(summary.mismatches, 0);

        let agreements = read(&config.output.output_dir.join("agreements.csv"));
        assert_eq!(agreements.len(), 2);
        assert_eq!(agreements[1][0], agreement(3).to_string());
        assert_eq!(agreements[1][3], "5000");
        assert_eq!(agreements[1][4], r#"{"kind":"ppa"}"#);
        assert_eq!(read(&config.settlement.cache_path).len(), 2);
    }

    #[tokio::test]
    async fn test_second_run_served_from_cache_written_by_first() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let events = || lifecycle(lifecycle(InMemoryEventSource::new(), 1, 100, 100), 2, 200, 200);

        let first_accessor = Arc::new(
            InMemoryAgreementAccessor::new()
                .with_agreement(agreement(1), data(100, true))
                .with_agreement(agreement(2), data(200, false)),
        );
        let first = run_with_source(
            &config,
            Arc::new(events()),
            Some(first_accessor.clone() as Arc<dyn AgreementDataAccessor>),
        )
        .await
        .unwrap();

        assert_eq!(first_accessor.total_calls(), 2);
        assert_eq!(first.settlement.as_ref().map(|s| s.excluded_events), Some(3));
        let agreements = read(&config.output.output_dir.join("agreements.csv"));
        assert_eq!(agreements.len(), 2);
        assert_eq!(agreements[1][0], agreement(1).to_string());
        // Invalid agreements are cached too.
        assert_eq!(read(&config.settlement.cache_path).len(), 3);

        let second_accessor = Arc::new(InMemoryAgreementAccessor::new());
        let second = run_with_source(
            &config,
            Arc::new(events()),
            Some(second_accessor.clone() as Arc<dyn AgreementDataAccessor>),
        )
        .await
        .unwrap();

        assert_eq!(second_accessor.total_calls(), 0);
        let stats = second.settlement.unwrap();
        assert_eq!(stats.cache_hits, 2);
        assert_eq!(stats.accessor_calls, 0);
        assert_eq!(read(&config.settlement.cache_path).len(), 3);
    }

    #[tokio::test]
    async fn test_amount_mismatch_written_and_run_succeeds() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let source = lifecycle(InMemoryEventSource::new(), 4, 5000, 4000);
        let accessor: Arc<dyn AgreementDataAccessor> =
            Arc::new(InMemoryAgreementAccessor::new().with_agreement(agreement(4), data(5000, true)));

        let summary = run_with_source(&config, Arc::new(source), Some(accessor))
            .await
            .unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.mismatches, 1);
        let mismatches = read(&config.output.output_dir.join("mismatches.csv"));
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[1][0], agreement(4).to_string());
        assert_eq!(mismatches[1][1], "5000");
        assert_eq!(mismatches[1][2], "4000");
    }

    #[tokio::test]
    async fn test_unknown_agreement_aborts_run() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let source = lifecycle(InMemoryEventSource::new(), 5, 1, 1);
        let accessor: Arc<dyn AgreementDataAccessor> = Arc::new(InMemoryAgreementAccessor::new());

        let err = run_with_source(&config, Arc::new(source), Some(accessor))
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("settlement reconciliation failed"));
        assert!(!config.output.output_dir.join("agreements.csv").exists());
    }
}
