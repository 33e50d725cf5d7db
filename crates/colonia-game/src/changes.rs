//! `ChangeSet`: what a controller call did, waiting to become a response.
//!
//! The controller records each change together with who may see it. The
//! handler then binds the set to the requesting player with
//! [`ChangeSet::build`], which keeps only what that player is entitled to.

use colonia_protocol::{Change, ClientError, PlayerId, Response};

/// Who may see a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Only this player.
    Player(PlayerId),
    /// Anyone who can see the object.
    All,
}

impl Audience {
    fn includes(self, player: PlayerId) -> bool {
        match self {
            Audience::Player(p) => p == player,
            Audience::All => true,
        }
    }
}

/// The outcome of one controller call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeSet {
    entries: Vec<(Audience, Change)>,
    error: Option<ClientError>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A refusal detected by the controller. Nothing was changed.
    pub fn rejected(error: ClientError) -> Self {
        Self {
            entries: Vec::new(),
            error: Some(error),
        }
    }

    /// Records a change, builder style.
    pub fn with(mut self, audience: Audience, change: Change) -> Self {
        self.entries.push((audience, change));
        self
    }

    /// Records a change visible only to `player`.
    pub fn private(self, player: PlayerId, change: Change) -> Self {
        self.with(Audience::Player(player), change)
    }

    /// Records a change visible to everyone.
    pub fn public(self, change: Change) -> Self {
        self.with(Audience::All, change)
    }

    pub fn is_rejected(&self) -> bool {
        self.error.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The changes `player` may see. Empty for a rejected set.
    pub fn visible_to(&self, player: PlayerId) -> Vec<Change> {
        self.entries
            .iter()
            .filter(|(audience, _)| audience.includes(player))
            .map(|(_, change)| change.clone())
            .collect()
    }

    /// The response for `player`.
    pub fn build(self, player: PlayerId) -> Response {
        if let Some(error) = self.error {
            return Response::Error(error);
        }
        Response::Update(
            self.entries
                .into_iter()
                .filter(|(audience, _)| audience.includes(player))
                .map(|(_, change)| change)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use colonia_protocol::ErrorReason;

    use super::*;

    #[test]
    fn test_build_filters_by_audience() {
        let set = ChangeSet::new()
            .private(PlayerId(1), Change::Gold { player: PlayerId(1), gold: 10 })
            .private(PlayerId(2), Change::Gold { player: PlayerId(2), gold: 20 })
            .public(Change::Removed { id: "unit:3".into() });
        assert_eq!(set.len(), 3);

        let Response::Update(changes) = set.build(PlayerId(1)) else {
            panic!("expected update");
        };
        assert_eq!(
            changes,
            vec![
                Change::Gold { player: PlayerId(1), gold: 10 },
                Change::Removed { id: "unit:3".into() },
            ]
        );
    }

    #[test]
    fn test_rejected_set_builds_error() {
        let set = ChangeSet::rejected(ClientError::new(ErrorReason::TradeRejected, "too poor"));
        assert!(set.is_rejected());
        let response = set.build(PlayerId(1));
        assert_eq!(response.error().unwrap().reason, ErrorReason::TradeRejected);
    }

    #[test]
    fn test_visible_to_other_player_sees_only_public() {
        let set = ChangeSet::new()
            .private(PlayerId(1), Change::Gold { player: PlayerId(1), gold: 10 })
            .public(Change::Removed { id: "unit:3".into() });
        assert_eq!(
            set.visible_to(PlayerId(2)),
            vec![Change::Removed { id: "unit:3".into() }]
        );
    }

    #[test]
    fn test_empty_set_is_empty_update() {
        assert_eq!(ChangeSet::new().build(PlayerId(1)), Response::Update(vec![]));
    }
}
