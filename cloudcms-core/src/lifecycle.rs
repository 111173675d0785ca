//! Entity lifecycle state machine.
//!
//! Pure functions shared by every content kind. Storage access happens in the
//! service layer; these functions only decide what the next stored state is.
//!
//! Rules:
//! - create: `lastChanged=now`, `deleted=false`, `curated` only when the
//!   creator matches exactly one registered curator.
//! - update: `lastChanged=now`, `curated`/`deleted` carried over from storage.
//! - soft delete: `deleted=flag`; `true` erases the payload for good.
//! - curation: `curated=flag`.

use chrono::SubsecRound;

use crate::clock::Clock;
use crate::content::{Payload, StoredContent};
use crate::error::ValidationError;
use crate::Timestamp;

/// Read the clock at the resolution timestamps are exchanged with clients.
pub fn stamp(clock: &dyn Clock) -> Timestamp {
    clock.now().trunc_subsecs(0)
}

/// Auto-curation policy. `None` means the curator lookup failed.
pub fn auto_curated(curator_matches: Option<usize>) -> bool {
    curator_matches == Some(1)
}

/// Normalise a freshly submitted entity before its first write.
pub fn prepare_create<P: Payload>(
    mut entity: StoredContent<P>,
    curator_matches: Option<usize>,
    now: Timestamp,
) -> StoredContent<P> {
    entity.header.last_changed = now;
    entity.header.deleted = false;
    entity.header.curated = auto_curated(curator_matches);
    entity
}

/// Validate the id supplied for an update.
pub fn require_update_id(id: i64) -> Result<i64, ValidationError> {
    if id <= 0 {
        return Err(ValidationError::MissingId {
            operation: "Update".to_string(),
        });
    }
    Ok(id)
}

/// Merge a full update into the currently stored entity.
///
/// The flags belong to the transition operations, so they are taken from
/// `existing`. An entity that is already deleted stays payload-free.
pub fn prepare_update<P: Payload>(
    mut incoming: StoredContent<P>,
    existing: &StoredContent<P>,
    now: Timestamp,
) -> StoredContent<P> {
    incoming.header.last_changed = now;
    incoming.header.curated = existing.header.curated;
    incoming.header.deleted = existing.header.deleted;
    if incoming.header.deleted {
        incoming.payload.clear();
    }
    incoming
}

/// Flag transitions with caller-supplied values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Deleted(bool),
    Curated(bool),
}

impl Transition {
    pub fn operation(&self) -> &'static str {
        match self {
            Transition::Deleted(_) => "deletion",
            Transition::Curated(_) => "curation",
        }
    }
}

/// Apply a transition in place. Each transition touches only its own flag
/// and `lastChanged`.
pub fn apply_transition<P: Payload>(entity: &mut StoredContent<P>, transition: Transition, now: Timestamp) {
    match transition {
        Transition::Deleted(flag) => {
            entity.header.deleted = flag;
            // No restore path: undeleting leaves the payload empty.
            if flag {
                entity.payload.clear();
            }
        }
        Transition::Curated(flag) => {
            entity.header.curated = flag;
        }
    }
    entity.header.last_changed = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::content::{ChartPayload, GChartPayload};
    use crate::header::ContentHeader;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn chart() -> StoredContent<ChartPayload> {
        StoredContent {
            header: ContentHeader {
                name: "Pace zones".to_string(),
                creator_id: "creator-1".to_string(),
                curated: true,
                deleted: true,
                ..Default::default()
            },
            payload: ChartPayload {
                chart_xml: "<chart/>".to_string(),
                image: vec![0xAB; 4],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_stamp_truncates_subseconds() {
        let clock = FixedClock(t0() + Duration::milliseconds(999));
        assert_eq!(stamp(&clock), t0());
    }

    #[test]
    fn test_create_ignores_client_flags() {
        let created = prepare_create(chart(), Some(0), t0());
        assert!(!created.header.deleted);
        assert!(!created.header.curated);
        assert_eq!(created.header.last_changed, t0());
        assert_eq!(created.payload.chart_xml, "<chart/>");
    }

    #[test]
    fn test_auto_curation_needs_exactly_one_match() {
        assert!(!auto_curated(Some(0)));
        assert!(auto_curated(Some(1)));
        assert!(!auto_curated(Some(2)));
        assert!(!auto_curated(None));
        assert!(prepare_create(chart(), Some(1), t0()).header.curated);
    }

    #[test]
    fn test_update_requires_positive_id() {
        assert!(matches!(
            require_update_id(0),
            Err(ValidationError::MissingId { .. })
        ));
        assert_eq!(require_update_id(12), Ok(12));
    }

    #[test]
    fn test_update_preserves_flags() {
        let mut existing = prepare_create(chart(), Some(1), t0());
        existing.header.deleted = false;
        let mut incoming = chart();
        incoming.header.curated = false;
        incoming.header.deleted = true;
        incoming.payload.chart_xml = "<chart v=\"2\"/>".to_string();

        let later = t0() + Duration::seconds(30);
        let updated = prepare_update(incoming, &existing, later);
        assert!(updated.header.curated);
        assert!(!updated.header.deleted);
        assert_eq!(updated.header.last_changed, later);
        assert_eq!(updated.payload.chart_xml, "<chart v=\"2\"/>");
    }

    #[test]
    fn test_update_of_deleted_entity_stays_empty() {
        let mut existing = prepare_create(chart(), None, t0());
        apply_transition(&mut existing, Transition::Deleted(true), t0());
        let updated = prepare_update(chart(), &existing, t0());
        assert!(updated.header.deleted);
        assert!(updated.payload.is_cleared());
    }

    #[test]
    fn test_delete_then_undelete_keeps_payload_empty() {
        let mut entity = prepare_create(chart(), None, t0());
        apply_transition(&mut entity, Transition::Deleted(true), t0());
        assert!(entity.payload.is_cleared());
        apply_transition(&mut entity, Transition::Deleted(false), t0() + Duration::seconds(1));
        assert!(!entity.header.deleted);
        assert!(entity.payload.is_cleared());
        assert_eq!(entity.header.last_changed, t0() + Duration::seconds(1));
    }

    #[test]
    fn test_curation_does_not_touch_payload_or_deleted() {
        let mut entity = prepare_create(chart(), None, t0());
        apply_transition(&mut entity, Transition::Curated(true), t0());
        assert!(entity.header.curated);
        assert!(!entity.header.deleted);
        assert!(!entity.payload.is_cleared());
    }

    // ========================================================================
    // Soft delete is irreversible for payload, whatever follows it
    // ========================================================================

    #[derive(Debug, Clone)]
    enum Step {
        Transition(Transition),
        Update(GChartPayload),
    }

    fn arb_payload() -> impl Strategy<Value = GChartPayload> {
        (".{0,12}", ".{0,12}", ".{0,24}", proptest::collection::vec(any::<u8>(), 0..16)).prop_map(
            |(chart_type, chart_view, chart_def, image)| GChartPayload {
                chart_type,
                chart_view,
                chart_def,
                image,
                ..Default::default()
            },
        )
    }

    fn arb_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            any::<bool>().prop_map(|f| Step::Transition(Transition::Deleted(f))),
            any::<bool>().prop_map(|f| Step::Transition(Transition::Curated(f))),
            arb_payload().prop_map(Step::Update),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_payload_never_returns_after_delete(
            initial in arb_payload(),
            steps in proptest::collection::vec(arb_step(), 0..12),
        ) {
            let mut entity = prepare_create(
                StoredContent { header: ContentHeader::default(), payload: initial },
                Some(0),
                t0(),
            );
            let mut deleted_once = false;

            for step in steps {
                match step {
                    Step::Transition(t) => {
                        if t == Transition::Deleted(true) {
                            deleted_once = true;
                        }
                        apply_transition(&mut entity, t, t0());
                    }
                    Step::Update(payload) => {
                        let incoming = StoredContent { header: entity.header.clone(), payload };
                        entity = prepare_update(incoming, &entity, t0());
                    }
                }
                if deleted_once && entity.header.deleted {
                    prop_assert!(entity.payload.is_cleared());
                }
            }
        }

        #[test]
        fn prop_transitions_only_touch_their_flag(flag in any::<bool>(), curated in any::<bool>()) {
            let mut entity = prepare_create(chart(), Some(0), t0());
            entity.header.curated = curated;
            let before = entity.header.clone();

            apply_transition(&mut entity, Transition::Curated(flag), t0());
            prop_assert_eq!(entity.header.deleted, before.deleted);
            prop_assert_eq!(entity.header.curated, flag);
            prop_assert_eq!(&entity.payload.chart_xml, "<chart/>");
        }
    }
}
