//! Deterministic selection of the active organisation.

use thiserror::Error;

use crate::models::{Organisation, UserData};

/// Why the active organisation could not be resolved.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguousOrganisation {
    #[error("multiple organisations but no selected organisation in session")]
    NoSelection,

    #[error("more than one organisation selected in session")]
    MultipleSelections,

    #[error("selected organisation has no id")]
    MissingId,

    #[error("selected organisation not found in available organisations")]
    NotACandidate,
}

/// Pick the single active organisation from `candidates`.
///
/// Exactly one candidate wins unconditionally, regardless of session
/// state. Otherwise the session's cached `UserData` must reference exactly
/// one organisation, with an id, that is among the candidates. Pure;
/// callers decide what an ambiguous result means (typically a redirect).
pub fn resolve_active_organisation<'a>(
    candidates: &'a [Organisation],
    session_data: Option<&UserData>,
) -> Result<&'a Organisation, AmbiguousOrganisation> {
    if let [only] = candidates {
        return Ok(only);
    }

    let selected = match session_data.map(|data| data.organisations.as_slice()) {
        Some([only]) => only,
        Some([]) | None => return Err(AmbiguousOrganisation::NoSelection),
        Some(_) => return Err(AmbiguousOrganisation::MultipleSelections),
    };

    let id = selected.id.ok_or(AmbiguousOrganisation::MissingId)?;

    candidates
        .iter()
        .find(|candidate| candidate.id == Some(id))
        .ok_or(AmbiguousOrganisation::NotACandidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn organisation(id: Option<Uuid>) -> Organisation {
        Organisation {
            id,
            ..Organisation::default()
        }
    }

    fn session_with(organisations: Vec<Organisation>) -> UserData {
        UserData {
            organisations,
            ..UserData::default()
        }
    }

    #[test]
    fn single_candidate_wins_unconditionally() {
        let id = Uuid::now_v7();
        let candidates = vec![organisation(Some(id))];

        // Session pointing elsewhere must not matter.
        let session = session_with(vec![organisation(Some(Uuid::now_v7()))]);

        let resolved = resolve_active_organisation(&candidates, Some(&session)).unwrap();
        assert_eq!(resolved.id, Some(id));
    }

    #[test]
    fn no_session_selection_is_ambiguous() {
        let candidates = vec![organisation(Some(Uuid::now_v7())), organisation(Some(Uuid::now_v7()))];

        assert_eq!(
            resolve_active_organisation(&candidates, None),
            Err(AmbiguousOrganisation::NoSelection)
        );
        assert_eq!(
            resolve_active_organisation(&candidates, Some(&session_with(vec![]))),
            Err(AmbiguousOrganisation::NoSelection)
        );
    }

    #[test]
    fn multiple_session_selections_are_ambiguous() {
        let candidates = vec![organisation(Some(Uuid::now_v7())), organisation(Some(Uuid::now_v7()))];
        let session = session_with(vec![
            organisation(Some(Uuid::now_v7())),
            organisation(Some(Uuid::now_v7())),
        ]);

        assert_eq!(
            resolve_active_organisation(&candidates, Some(&session)),
            Err(AmbiguousOrganisation::MultipleSelections)
        );
    }

    #[test]
    fn selection_without_id_is_unresolvable() {
        let candidates = vec![organisation(Some(Uuid::now_v7())), organisation(Some(Uuid::now_v7()))];
        let session = session_with(vec![organisation(None)]);

        assert_eq!(
            resolve_active_organisation(&candidates, Some(&session)),
            Err(AmbiguousOrganisation::MissingId)
        );
    }

    #[test]
    fn selection_must_be_among_candidates() {
        let matching = Uuid::now_v7();
        let candidates = vec![organisation(Some(matching)), organisation(Some(Uuid::now_v7()))];

        let found = resolve_active_organisation(
            &candidates,
            Some(&session_with(vec![organisation(Some(matching))])),
        )
        .unwrap();
        assert_eq!(found.id, Some(matching));

        assert_eq!(
            resolve_active_organisation(
                &candidates,
                Some(&session_with(vec![organisation(Some(Uuid::now_v7()))])),
            ),
            Err(AmbiguousOrganisation::NotACandidate)
        );
    }
}
