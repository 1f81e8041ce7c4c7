//! Weighted prize selection and voucher codes.

use rand::Rng;
use spindle_types::spin::Prize;
use spindle_types::{SpinId, TenantId};

/// Context string for voucher-code derivation.
const VOUCHER_CODE_CONTEXT: &str = "spindle v1 voucher-code";

/// Pick a prize by a pre-rolled value in `0..total_weight`.
///
/// Pure so selection is deterministic under test; [`roll`] supplies the
/// randomness in production. Returns `None` for an empty wheel or an
/// out-of-range roll.
pub fn pick(prizes: &[Prize], rolled: u64) -> Option<&Prize> {
    let total: u64 = prizes.iter().map(|p| u64::from(p.weight)).sum();
    if total == 0 || rolled >= total {
        return None;
    }

    let mut cursor = rolled;
    for prize in prizes {
        let weight = u64::from(prize.weight);
        if cursor < weight {
            return Some(prize);
        }
        cursor -= weight;
    }
    None
}

/// Roll the wheel: weighted-random selection over the given prizes.
pub fn roll<'a, R: Rng>(prizes: &'a [Prize], rng: &mut R) -> Option<&'a Prize> {
    let total: u64 = prizes.iter().map(|p| u64::from(p.weight)).sum();
    if total == 0 {
        return None;
    }
    pick(prizes, rng.gen_range(0..total))
}

/// Derive a unique voucher code from the (tenant, spin) pair.
pub fn voucher_code(tenant_id: TenantId, spin_id: SpinId) -> String {
    let mut material = [0u8; 16];
    material[..8].copy_from_slice(&tenant_id.to_le_bytes());
    material[8..].copy_from_slice(&spin_id.to_le_bytes());
    let key = blake3::derive_key(VOUCHER_CODE_CONTEXT, &material);
    hex::encode(&key[..5]).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prize(id: i64, weight: u32) -> Prize {
        Prize {
            id,
            campaign_id: 1,
            label: format!("prize-{id}"),
            weight,
            current_stock: None,
            is_active: true,
        }
    }

    #[test]
    fn test_pick_respects_weights() {
        let prizes = vec![prize(1, 3), prize(2, 7)];
        for rolled in 0..3 {
            assert_eq!(pick(&prizes, rolled).map(|p| p.id), Some(1));
        }
        for rolled in 3..10 {
            assert_eq!(pick(&prizes, rolled).map(|p| p.id), Some(2));
        }
        assert!(pick(&prizes, 10).is_none(), "roll out of range");
    }

    #[test]
    fn test_pick_empty_wheel() {
        assert!(pick(&[], 0).is_none());
    }

    #[test]
    fn test_roll_lands_on_some_prize() {
        let prizes = vec![prize(1, 1), prize(2, 1)];
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let picked = roll(&prizes, &mut rng).expect("non-empty wheel");
            assert!(picked.id == 1 || picked.id == 2);
        }
    }

    #[test]
    fn test_voucher_codes_are_stable_and_distinct() {
        let a = voucher_code(1, 1);
        let b = voucher_code(1, 2);
        let c = voucher_code(2, 1);
        assert_eq!(a, voucher_code(1, 1));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 10);
    }
}
