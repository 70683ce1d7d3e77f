use proptest::prelude::*;

use btcv_script::chunk::decode_script;
use btcv_script::{MultiKeyScriptGenerator, Script, ThreeKeysHWScriptGenerator};

fn compressed_key() -> impl Strategy<Value = String> {
    (prop::sample::select(vec![0x02u8, 0x03]), prop::array::uniform32(any::<u8>()))
        .prop_map(|(prefix, body)| {
            let mut key = vec![prefix];
            key.extend_from_slice(&body);
            hex::encode(key)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn push_data_is_minimal_and_decodes(data in prop::collection::vec(any::<u8>(), 1..600)) {
        let mut script = Script::new();
        script.append_push_data(&data).unwrap();
        let prefix_len = match data.len() {
            1..=75 => 1,
            76..=255 => 2,
            _ => 3,
        };
        prop_assert_eq!(script.len(), data.len() + prefix_len);

        let chunks = decode_script(script.to_bytes()).unwrap();
        prop_assert_eq!(chunks.len(), 1);
        prop_assert_eq!(chunks[0].data.as_deref(), Some(&data[..]));
    }

    #[test]
    fn script_hex_roundtrip(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let script = Script::from_bytes(&data);
        let script2 = Script::from_hex(&script.to_hex()).unwrap();
        prop_assert_eq!(script.to_bytes(), script2.to_bytes());
    }

    #[test]
    fn decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..128)) {
        let _ = decode_script(&data);
    }

    #[test]
    fn any_three_keys_select_expected_counts(
        alert in compressed_key(),
        instant in compressed_key(),
        recovery in compressed_key(),
    ) {
        let mut generator = ThreeKeysHWScriptGenerator::new();
        let redeem = generator
            .get_redeem_script(&[alert.as_str(), instant.as_str(), recovery.as_str()])
            .unwrap();
        prop_assert_eq!(redeem.len(), 113);

        generator.set_alert();
        prop_assert_eq!(redeem.multikey_policy_branches(generator.witness_flags()).unwrap(), 1);
        generator.set_instant();
        prop_assert_eq!(redeem.multikey_policy_branches(generator.witness_flags()).unwrap(), 2);
        generator.set_recovery();
        prop_assert_eq!(redeem.multikey_policy_branches(generator.witness_flags()).unwrap(), 3);
    }
}
