//! validator signature recovery
//!
//! Each commit signature is recovered into the ECDSA key that made it, the
//! key is matched against the validator's consensus address, and the
//! signature is repackaged as `(r, s, v, prefix, suffix)` so an EVM
//! contract can rebuild `sha256(prefix || block_hash || suffix)` and run
//! `ecrecover` without knowing anything about vote encoding.

use alloy_primitives::Address;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use sha3::Keccak256;
use tracing::{debug, info, warn};

use bandproof_merkle::{sha256, BlockId, BlockTime, Hash};

use crate::config::{ProofConfig, SignerPolicy};
use crate::error::{ProofError, Result};
use crate::vote::CommonVoteParts;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum BlockIdFlag {
    #[default]
    Unknown = 0,
    Absent = 1,
    Commit = 2,
    Nil = 3,
}

impl TryFrom<u8> for BlockIdFlag {
    type Error = ProofError;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            0 => Ok(BlockIdFlag::Unknown),
            1 => Ok(BlockIdFlag::Absent),
            2 => Ok(BlockIdFlag::Commit),
            3 => Ok(BlockIdFlag::Nil),
            other => Err(ProofError::malformed(format!("unknown block id flag {}", other))),
        }
    }
}

impl From<BlockIdFlag> for u8 {
    fn from(flag: BlockIdFlag) -> u8 {
        flag as u8
    }
}

/// One validator's entry in a commit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSig {
    pub block_id_flag: BlockIdFlag,
    #[serde(with = "hex::serde")]
    pub validator_address: Vec<u8>,
    pub timestamp: BlockTime,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub height: u64,
    pub round: u32,
    pub block_id: BlockId,
    pub signatures: Vec<CommitSig>,
}

/// A signature in the form the EVM verifier consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmSignature {
    #[serde(with = "hex::serde")]
    pub r: Hash,
    #[serde(with = "hex::serde")]
    pub s: Hash,
    pub v: u8,
    #[serde(with = "hex::serde")]
    pub signed_data_prefix: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub signed_data_suffix: Vec<u8>,
}

impl TmSignature {
    /// `prefix || block_hash || suffix`, the exact bytes that were signed
    pub fn signed_message(&self, block_hash: &[u8]) -> Vec<u8> {
        let mut msg = Vec::with_capacity(
            self.signed_data_prefix.len() + block_hash.len() + self.signed_data_suffix.len(),
        );
        msg.extend_from_slice(&self.signed_data_prefix);
        msg.extend_from_slice(block_hash);
        msg.extend_from_slice(&self.signed_data_suffix);
        msg
    }

    /// What `ecrecover(sha256(msg), v, r, s)` returns on the verifier side.
    pub fn recover_evm_address(&self, block_hash: &[u8]) -> Result<Address> {
        let id = self
            .v
            .checked_sub(27)
            .and_then(RecoveryId::from_byte)
            .ok_or_else(|| ProofError::malformed(format!("invalid recovery byte v={}", self.v)))?;
        let signature = Signature::from_scalars(self.r, self.s)
            .map_err(|e| ProofError::malformed(format!("invalid signature scalars: {}", e)))?;
        let digest = sha256(&self.signed_message(block_hash));
        let key = VerifyingKey::recover_from_prehash(&digest, &signature, id)
            .map_err(|e| ProofError::malformed(format!("signature does not recover: {}", e)))?;
        Ok(evm_address(&key))
    }
}

/// CometBFT address: `ripemd160(sha256(compressed pubkey))`.
pub fn tendermint_address(key: &VerifyingKey) -> [u8; 20] {
    let compressed = key.to_encoded_point(true);
    Ripemd160::digest(sha256(compressed.as_bytes())).into()
}

/// Last 20 bytes of `keccak256` over the uncompressed point without its tag.
pub fn evm_address(key: &VerifyingKey) -> Address {
    let uncompressed = key.to_encoded_point(false);
    let digest = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    Address::from_slice(&digest[12..])
}

/// Try both recovery ids; returns the EVM address and `v` of the one that
/// matches `validator`.
fn recover_signer(digest: &Hash, signature: &Signature, validator: &[u8]) -> Option<(Address, u8)> {
    (0u8..2).find_map(|id| {
        let key = VerifyingKey::recover_from_prehash(digest, signature, RecoveryId::from_byte(id)?).ok()?;
        (tendermint_address(&key).as_slice() == validator).then(|| (evm_address(&key), 27 + id))
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedSignature {
    /// position in the commit's signature list
    pub index: usize,
    #[serde(with = "hex::serde")]
    pub validator_address: Vec<u8>,
}

/// Recovered signatures sorted by signer, plus any that were skipped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSet {
    pub signatures: Vec<TmSignature>,
    pub signers: Vec<Address>,
    pub failed: Vec<FailedSignature>,
}

struct Recovered {
    signer: Address,
    signature: TmSignature,
}

fn recover_vote(
    common: &CommonVoteParts,
    block_hash: &[u8],
    chain_id: &str,
    vote: &CommitSig,
) -> Result<Option<Recovered>> {
    if vote.signature.len() != 64 {
        return Err(ProofError::malformed(format!(
            "signature is {} bytes, expected 64",
            vote.signature.len()
        )));
    }
    let tail = CommonVoteParts::vote_tail(&vote.timestamp, chain_id)?;
    let (signed_data_prefix, signed_data_suffix, digest) = common.split_for_vote(block_hash, &tail);

    let Ok(signature) = Signature::from_slice(&vote.signature) else {
        return Ok(None);
    };
    let Some((signer, v)) = recover_signer(&digest, &signature, &vote.validator_address) else {
        return Ok(None);
    };

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&vote.signature[..32]);
    s.copy_from_slice(&vote.signature[32..]);
    debug!(validator = %hex::encode_upper(&vote.validator_address), %signer, v, "recovered signer");

    Ok(Some(Recovered {
        signer,
        signature: TmSignature {
            r,
            s,
            v,
            signed_data_prefix,
            signed_data_suffix,
        },
    }))
}

/// Recover every precommit for the commit's block.
///
/// Votes that did not commit to the block are ignored. An unmatched signer
/// either fails the call or is reported in [`SignatureSet::failed`],
/// depending on the configured [`SignerPolicy`].
pub fn recover_signatures(chain_id: &str, commit: &Commit, config: &ProofConfig) -> Result<SignatureSet> {
    let common = CommonVoteParts::precommit(commit.height, commit.round, &commit.block_id)?;
    let block_hash = commit.block_id.hash.as_slice();

    let votes: Vec<(usize, &CommitSig)> = commit
        .signatures
        .iter()
        .enumerate()
        .filter(|(_, sig)| sig.block_id_flag == BlockIdFlag::Commit)
        .collect();
    if votes.is_empty() {
        return Err(ProofError::NoValidPrecommit);
    }

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<Option<Recovered>>> = {
        use rayon::prelude::*;
        votes
            .par_iter()
            .map(|(_, vote)| recover_vote(&common, block_hash, chain_id, vote))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<Option<Recovered>>> = votes
        .iter()
        .map(|(_, vote)| recover_vote(&common, block_hash, chain_id, vote))
        .collect();

    let mut recovered = Vec::with_capacity(votes.len());
    let mut failed = Vec::new();
    for ((index, vote), outcome) in votes.iter().zip(outcomes) {
        match outcome? {
            Some(r) => recovered.push(r),
            None if config.signer_policy == SignerPolicy::Strict => {
                return Err(ProofError::SignerNotFound {
                    index: *index,
                    validator: hex::encode_upper(&vote.validator_address),
                });
            }
            None => {
                warn!(
                    index,
                    validator = %hex::encode_upper(&vote.validator_address),
                    "no matching signer, skipping signature"
                );
                failed.push(FailedSignature {
                    index: *index,
                    validator_address: vote.validator_address.clone(),
                });
            }
        }
    }

    recovered.sort_by(|a, b| a.signer.cmp(&b.signer));
    if let Some(pair) = recovered.windows(2).find(|w| w[0].signer == w[1].signer) {
        return Err(ProofError::malformed(format!(
            "signer {} appears twice in the commit",
            pair[0].signer
        )));
    }

    let required = config.min_signatures.max(1);
    if recovered.len() < required {
        return Err(ProofError::InsufficientSignatures {
            got: recovered.len(),
            required,
        });
    }

    info!(
        height = commit.height,
        recovered = recovered.len(),
        skipped = failed.len(),
        "recovered commit signatures"
    );
    let (signers, signatures) = recovered.into_iter().map(|r| (r.signer, r.signature)).unzip();
    Ok(SignatureSet {
        signatures,
        signers,
        failed,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bandproof_merkle::PartSetHeader;
    use base64::Engine;
    use hex_literal::hex;

    fn b64(s: &str) -> Vec<u8> {
        base64::engine::general_purpose::STANDARD.decode(s).unwrap()
    }

    fn vote(validator: [u8; 20], seconds: u64, nanos: u32, sig: &str) -> CommitSig {
        CommitSig {
            block_id_flag: BlockIdFlag::Commit,
            validator_address: validator.to_vec(),
            timestamp: BlockTime::new(seconds, nanos),
            signature: b64(sig),
        }
    }

    /// four-validator commit for block 25000 on "bandchain"
    pub fn commit_25000() -> Commit {
        Commit {
            height: 25000,
            round: 0,
            block_id: BlockId {
                hash: hex!("3489F21785ACE1CE4214CB2B57F3A98DC0B7377D1BA1E1180B6E199E33B0FC5A").to_vec(),
                part_set_header: PartSetHeader {
                    total: 1,
                    hash: hex!("6BF91EFBA26A4CD86EBBD0E54DCFC9BD2C790859CFA96215661A47E4921A6301").to_vec(),
                },
            },
            signatures: vec![
                vote(
                    hex!("5179B0BB203248E03D2A1342896133B5C58E1E44"),
                    1629849933,
                    107055466,
                    "OUNlGT+BnPU5OBNm0xtsWEmqoxroum+VxixcgGVr+1xqB+SjwKvOrl+FTUkt9plDj7hHYvFS9znd6sSN3Py1zA==",
                ),
                vote(
                    hex!("BDB6A0728C8DFE2124536F16F2BA428FE767A8F9"),
                    1629849933,
                    128300266,
                    "hLhYW3EkD+4OZ0lSt57SXXk/GzG0LdN7gPdbmFELV1QexE3XxTiUdN+OXCXMbti1c8yi4Amqgk7oJb3Gk5NZJw==",
                ),
                vote(
                    hex!("F0C23921727D869745C4F9703CF33996B1D2B715"),
                    1629849933,
                    108916976,
                    "VlSkT7iTMMNM8thi+UB2MZShRbcu07sK3VdZ4eaP0UUqx5XQKpxXTPEjQ/38Z/3O2KJPiOyBOMf4Iw9utEK3Jg==",
                ),
                vote(
                    hex!("F23391B5DBF982E37FB7DADEA64AAE21CAE4C172"),
                    1629849933,
                    120372486,
                    "XXtL57IbANCK19vkjPJ2HOzLWZ5kqrELKQGg3VjwAyVxYO9omlM8Hpg3B1B/yEZtrqHQ3HqInjon0bsdCc7AMA==",
                ),
            ],
        }
    }

    const SUFFIX_25000: [u8; 38] =
        hex!("1224080112206BF91EFBA26A4CD86EBBD0E54DCFC9BD2C790859CFA96215661A47E4921A6301");

    fn suffix_with_time(ts: &[u8]) -> Vec<u8> {
        let mut out = SUFFIX_25000.to_vec();
        out.push(0x2a);
        out.push(ts.len() as u8);
        out.extend_from_slice(ts);
        out.extend_from_slice(&hex!("320962616e64636861696e"));
        out
    }

    #[test]
    fn test_recover_commit_25000() {
        let set = recover_signatures("bandchain", &commit_25000(), &ProofConfig::default()).unwrap();
        assert!(set.failed.is_empty());
        assert_eq!(
            set.signers,
            vec![
                Address::from(hex!("652D89a66Eb4eA55366c45b1f9ACfc8e2179E1c5")),
                Address::from(hex!("88e1cd00710495EEB93D4f522d16bC8B87Cb00FE")),
                Address::from(hex!("aAA22E077492CbaD414098EBD98AA8dc1C7AE8D9")),
                Address::from(hex!("B956589b6fC5523eeD0d9eEcfF06262Ce84ff260")),
            ]
        );

        let expected = [
            (
                hex!("84B8585B71240FEE0E674952B79ED25D793F1B31B42DD37B80F75B98510B5754"),
                hex!("1EC44DD7C5389474DF8E5C25CC6ED8B573CCA2E009AA824EE825BDC693935927"),
                hex!("08CD9296890610EAE9963D").to_vec(),
            ),
            (
                hex!("394365193F819CF539381366D31B6C5849AAA31AE8BA6F95C62C5C80656BFB5C"),
                hex!("6A07E4A3C0ABCEAE5F854D492DF699438FB84762F152F739DDEAC48DDCFCB5CC"),
                hex!("08CD9296890610EA928633").to_vec(),
            ),
            (
                hex!("5D7B4BE7B21B00D08AD7DBE48CF2761CECCB599E64AAB10B2901A0DD58F00325"),
                hex!("7160EF689A533C1E983707507FC8466DAEA1D0DC7A889E3A27D1BB1D09CEC030"),
                hex!("08CD929689061086FAB239").to_vec(),
            ),
            (
                hex!("5654A44FB89330C34CF2D862F940763194A145B72ED3BB0ADD5759E1E68FD145"),
                hex!("2AC795D02A9C574CF12343FDFC67FDCED8A24F88EC8138C7F8230F6EB442B726"),
                hex!("08CD9296890610F0E1F733").to_vec(),
            ),
        ];
        assert_eq!(set.signatures.len(), expected.len());
        for (sig, (r, s, ts)) in set.signatures.iter().zip(expected.iter()) {
            assert_eq!(&sig.r, r);
            assert_eq!(&sig.s, s);
            assert_eq!(sig.v, 28);
            assert_eq!(sig.signed_data_prefix, hex!("6d080211A86100000000000022480A20"));
            assert_eq!(sig.signed_data_suffix, suffix_with_time(ts));
        }

        let block_hash = commit_25000().block_id.hash;
        for (sig, signer) in set.signatures.iter().zip(&set.signers) {
            assert_eq!(sig.recover_evm_address(&block_hash).unwrap(), *signer);
        }
    }

    #[test]
    fn test_recover_commit_round_zero_height_one() {
        let commit = Commit {
            height: 1,
            round: 0,
            block_id: BlockId {
                hash: hex!("442E3E690F13C2EEBDBFC3DBF80B2373CBBCFA2C12CF17FB9A22A17552A5BF2B").to_vec(),
                part_set_header: PartSetHeader {
                    total: 1,
                    hash: hex!("B9F8E456397FF911BDC55D91B0DBEEDFB59711A87C4223DEB5217C93B9CA60FE").to_vec(),
                },
            },
            signatures: vec![
                vote(
                    hex!("F0C23921727D869745C4F9703CF33996B1D2B715"),
                    1622718337,
                    834259369,
                    "PqaRaT+IuvAlUqQm+HgTpeDbgUytz4Laxh9ZJOeM7ZtuOrzc2YPoml95KD+rx7TDM1YCc4DM4TjnjxICvrBW0g==",
                ),
                vote(
                    hex!("BDB6A0728C8DFE2124536F16F2BA428FE767A8F9"),
                    1622718337,
                    856577545,
                    "x8PIR8F4d1BdC9lACchSQdSNsvQ8ZDHAik0eIaO/Jf9UFhomQHjXYmamikU8IFVpAfUhKpGpxqYqRZMek0n8XQ==",
                ),
                vote(
                    hex!("F23391B5DBF982E37FB7DADEA64AAE21CAE4C172"),
                    1622718337,
                    834252296,
                    "db7HnsXg0RG5SpR4hshq+qHLhZZdnyxl+nZCm2SOhHEI1kJbG1vWObtkGmZu6lk4IT+znXfPJHC2dZeanYMTfg==",
                ),
            ],
        };
        let set = recover_signatures("odin", &commit, &ProofConfig::default()).unwrap();
        let expected = vec![
            TmSignature {
                r: hex!("c7c3c847c17877505d0bd94009c85241d48db2f43c6431c08a4d1e21a3bf25ff"),
                s: hex!("54161a264078d76266a68a453c20556901f5212a91a9c6a62a45931e9349fc5d"),
                v: 28,
                signed_data_prefix: hex!("69080211010000000000000022480a20").to_vec(),
                signed_data_suffix: hex!("122408011220b9f8e456397ff911bdc55d91b0dbeedfb59711a87c4223deb5217c93b9ca60fe2a0c0881efe285061089acb9980332046f64696e").to_vec(),
            },
            TmSignature {
                r: hex!("75bec79ec5e0d111b94a947886c86afaa1cb85965d9f2c65fa76429b648e8471"),
                s: hex!("08d6425b1b5bd639bb641a666eea5938213fb39d77cf2470b675979a9d83137e"),
                v: 28,
                signed_data_prefix: hex!("69080211010000000000000022480a20").to_vec(),
                signed_data_suffix: hex!("122408011220b9f8e456397ff911bdc55d91b0dbeedfb59711a87c4223deb5217c93b9ca60fe2a0c0881efe285061088dce68d0332046f64696e").to_vec(),
            },
            TmSignature {
                r: hex!("3ea691693f88baf02552a426f87813a5e0db814cadcf82dac61f5924e78ced9b"),
                s: hex!("6e3abcdcd983e89a5f79283fabc7b4c33356027380cce138e78f1202beb056d2"),
                v: 27,
                signed_data_prefix: hex!("69080211010000000000000022480a20").to_vec(),
                signed_data_suffix: hex!("122408011220b9f8e456397ff911bdc55d91b0dbeedfb59711a87c4223deb5217c93b9ca60fe2a0c0881efe2850610a993e78d0332046f64696e").to_vec(),
            },
        ];
        assert_eq!(set.signatures, expected);
    }

    #[test]
    fn test_verifier_side_recovery() {
        // round 0 precommits for block 180356 on band-laozi-testnet1
        let block_hash = hex!("8C36C3D12A378BD7E4E8F26BDECCA68B48390240DA456EE9C3292B6E36756AC4");
        let prefix = hex!("7808021184C002000000000022480A20").to_vec();
        let suffix = |ts: &str| {
            let mut s = hex!("12240801122044551F853D916A7C630C0C210C921BAC7D05CE0C249DFC6088C0274F05841827").to_vec();
            s.extend_from_slice(&hex::decode(ts).unwrap());
            s.extend_from_slice(&hex!("321362616E642D6C616F7A692D746573746E657431"));
            s
        };
        let cases = [
            (
                hex!("6916405D52FF02EC26DD78E831E0A179C89B99CBBDB15C9DA802B75A7621D5EB"),
                hex!("69CF40BE7AC1AA176B13BA4D57EB2B8735A5832014F0DC168EA6F580C51BB222"),
                28,
                "2A0C08DE9493850610F0FFAEEB02",
                hex!("3b759C4d728e50D5cC04c75f596367829d5b5061"),
            ),
            (
                hex!("6A8E3C35DEED991D257BCA9451360BFBE7978D388AF8D2F864A6919FE1083C7E"),
                hex!("14D145DD6BC1A770ACBDF37DAC08DD8076AB888FDA2739BE9B9767B23A387D1E"),
                27,
                "2A0C08DE9493850610DAEB8D9C03",
                hex!("49897b9D617AD700b84a935616E81f9f4b5305bc"),
            ),
            (
                hex!("EB402F4B863A1DF91E7772D9574640EFFC5447ECEC6EDF6F1CFE2C33D7DC8DD4"),
                hex!("1FEC45523E885DD6E8AD75EA2D81D30657267DF646406240F206A98749EBD0A7"),
                27,
                "2A0C08DE9493850610B68FD4E702",
                hex!("7054bd1Fd7535A0DD552361e634196b1574594BB"),
            ),
        ];
        for (r, s, v, ts, address) in cases {
            let sig = TmSignature {
                r,
                s,
                v,
                signed_data_prefix: prefix.clone(),
                signed_data_suffix: suffix(ts),
            };
            assert_eq!(sig.recover_evm_address(&block_hash).unwrap(), Address::from(address));
        }
    }

    #[test]
    fn test_output_independent_of_commit_order() {
        let mut commit = commit_25000();
        let sorted = recover_signatures("bandchain", &commit, &ProofConfig::default()).unwrap();
        commit.signatures.reverse();
        let reversed = recover_signatures("bandchain", &commit, &ProofConfig::default()).unwrap();
        assert_eq!(sorted, reversed);
    }

    #[test]
    fn test_non_commit_votes_are_skipped() {
        let mut commit = commit_25000();
        commit.signatures[0].block_id_flag = BlockIdFlag::Nil;
        commit.signatures[2] = CommitSig {
            block_id_flag: BlockIdFlag::Absent,
            ..Default::default()
        };
        let set = recover_signatures("bandchain", &commit, &ProofConfig::default()).unwrap();
        assert_eq!(set.signatures.len(), 2);
    }

    #[test]
    fn test_all_nil_commit_fails() {
        let mut commit = commit_25000();
        for sig in commit.signatures.iter_mut() {
            sig.block_id_flag = BlockIdFlag::Nil;
        }
        let err = recover_signatures("bandchain", &commit, &ProofConfig::default()).unwrap_err();
        assert_eq!(err, ProofError::NoValidPrecommit);
        assert!(err.to_string().contains("no valid precommit"));
    }

    #[test]
    fn test_unknown_signer_fails_strict() {
        let mut commit = commit_25000();
        commit.signatures[1].validator_address[0] ^= 0xff;
        match recover_signatures("bandchain", &commit, &ProofConfig::default()) {
            Err(ProofError::SignerNotFound { index, validator }) => {
                assert_eq!(index, 1);
                assert_eq!(validator, "42B6A0728C8DFE2124536F16F2BA428FE767A8F9");
            }
            other => panic!("expected signer not found, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_chain_id_fails() {
        let err = recover_signatures("odin", &commit_25000(), &ProofConfig::default()).unwrap_err();
        assert!(matches!(err, ProofError::SignerNotFound { index: 0, .. }));
    }

    #[test]
    fn test_skip_unmatched_policy() {
        let mut commit = commit_25000();
        commit.signatures[3].timestamp.nanos += 1;
        let config = ProofConfig::default().with_signer_policy(SignerPolicy::SkipUnmatched);

        let set = recover_signatures("bandchain", &commit, &config).unwrap();
        assert_eq!(set.signatures.len(), 3);
        assert_eq!(
            set.failed,
            vec![FailedSignature {
                index: 3,
                validator_address: hex!("F23391B5DBF982E37FB7DADEA64AAE21CAE4C172").to_vec(),
            }]
        );
        assert!(!set
            .signers
            .contains(&Address::from(hex!("aAA22E077492CbaD414098EBD98AA8dc1C7AE8D9"))));

        let config = config.with_min_signatures(4);
        assert_eq!(
            recover_signatures("bandchain", &commit, &config).unwrap_err(),
            ProofError::InsufficientSignatures { got: 3, required: 4 }
        );
    }

    #[test]
    fn test_short_signature_is_malformed() {
        let mut commit = commit_25000();
        commit.signatures[2].signature.push(0x1b);
        let config = ProofConfig::default().with_signer_policy(SignerPolicy::SkipUnmatched);
        let err = recover_signatures("bandchain", &commit, &config).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedInput);
    }

    #[test]
    fn test_duplicate_signer_rejected() {
        let mut commit = commit_25000();
        let dup = commit.signatures[0].clone();
        commit.signatures.push(dup);
        assert!(recover_signatures("bandchain", &commit, &ProofConfig::default()).is_err());
    }
}
