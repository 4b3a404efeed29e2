//! Per-player upkeep
//!
//! Runs once per tick for every spawned player: growth, income, troop
//! rebalancing, expiry of alliances and embargoes, and the periodic sweep
//! that hands encircled pockets of territory to whoever surrounds them.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::core::config::GameMode;
use crate::core::random::simple_hash;
use crate::core::types::{MessageSeverity, Owner, PlayerId, Tick, TileRef};
use crate::execution::Executable;
use crate::game::{Game, Player};
use crate::map::GameMap;

/// Inclusive tile-coordinate rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoundingBox {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl BoundingBox {
    fn of<'a>(map: &GameMap, tiles: impl IntoIterator<Item = &'a TileRef>) -> Option<Self> {
        let mut bbox: Option<BoundingBox> = None;
        for &tile in tiles {
            let (x, y) = (map.x(tile), map.y(tile));
            bbox = Some(match bbox {
                None => BoundingBox {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                },
                Some(b) => BoundingBox {
                    min_x: b.min_x.min(x),
                    min_y: b.min_y.min(y),
                    max_x: b.max_x.max(x),
                    max_y: b.max_y.max(y),
                },
            });
        }
        bbox
    }

    fn contains(&self, inner: &BoundingBox) -> bool {
        self.min_x <= inner.min_x
            && self.min_y <= inner.min_y
            && self.max_x >= inner.max_x
            && self.max_y >= inner.max_y
    }
}

#[derive(Debug)]
pub struct PlayerExecution {
    player: PlayerId,
    last_cluster_check: Tick,
    active: bool,
}

impl PlayerExecution {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            last_cluster_check: 0,
            active: true,
        }
    }

    fn capture_or_drop_stranded_units(&self, game: &mut Game) {
        for id in game.units_of(self.player, &[]) {
            let Some((tile, unit_type)) = game.unit(id).map(|u| (u.tile(), u.unit_type())) else {
                continue;
            };
            if !game.config().unit_info(unit_type).territory_bound {
                continue;
            }
            match game.map().owner(tile) {
                Owner::Player(owner) if owner == self.player => {}
                Owner::Player(owner) => game.capture_unit(id, owner),
                Owner::TerraNullius => game.remove_unit(id),
            }
        }
    }

    /// Same-team neighbor sharing the longest border
    fn closest_teammate(&self, game: &Game) -> Option<PlayerId> {
        game.neighbors_of(self.player)
            .into_iter()
            .filter_map(Owner::player)
            .filter(|&other| game.is_on_same_team(self.player, other))
            .max_by_key(|&other| {
                (
                    game.shared_border_count(self.player, other),
                    std::cmp::Reverse(other),
                )
            })
    }

    fn give_everything_to(&self, game: &mut Game, heir: PlayerId) {
        let tiles: Vec<TileRef> = game
            .player(self.player)
            .map(|p| p.tiles().iter().copied().collect())
            .unwrap_or_default();
        for tile in tiles {
            game.conquer(heir, tile);
        }
        game.transfer_gold(self.player, heir);
        let (troops, workers) = game
            .player_mut(self.player)
            .map(|p| {
                let troops = p.troops();
                let workers = p.workers();
                (p.remove_troops(troops), p.remove_workers(workers))
            })
            .unwrap_or((0.0, 0.0));
        if let Some(p) = game.player_mut(heir) {
            p.add_troops(troops);
            p.add_workers(workers);
        }
        for unit in game.units_of(self.player, &[]) {
            game.capture_unit(unit, heir);
        }
        tracing::info!(player = ?self.player, ?heir, "disconnected player handed over to teammate");
    }

    fn grow(&self, game: &mut Game) {
        let Some(player) = game.player(self.player) else {
            return;
        };
        let growth = game.config().population_increase_rate(game, player);
        let ratio = player.target_troop_ratio();
        let gold = game.config().gold_addition_rate(player);
        if let Some(p) = game.player_mut(self.player) {
            p.add_troops(growth * ratio);
            p.add_workers(growth * (1.0 - ratio));
            p.add_gold(gold);
        }
        game.stats_mut().gold_work(self.player, gold);

        let Some(player) = game.player(self.player) else {
            return;
        };
        let adjustment = game.config().troop_adjustment_rate(game, player);
        if let Some(p) = game.player_mut(self.player) {
            if adjustment >= 0.0 {
                let moved = p.remove_workers(adjustment);
                p.add_troops(moved);
            } else {
                let moved = p.remove_troops(-adjustment);
                p.add_workers(moved);
            }
        }
    }

    fn expire_agreements(&self, game: &mut Game) {
        let now = game.ticks();
        let duration = game.settings().alliance_duration;
        let expired: Vec<_> = game
            .alliances()
            .filter(|al| al.involves(self.player) && now.saturating_sub(al.created_at) > duration)
            .map(|al| al.id)
            .collect();
        for id in expired {
            tracing::debug!(?id, "alliance expired");
            game.remove_alliance(id);
        }
        let embargo_duration = game.settings().temporary_embargo_duration;
        if let Some(p) = game.player_mut(self.player) {
            p.expire_embargoes(now, embargo_duration);
        }
    }

    /// Groups of border tiles connected through diagonal contact, largest first
    fn clusters(&self, game: &Game) -> Vec<BTreeSet<TileRef>> {
        let Some(player) = game.player(self.player) else {
            return Vec::new();
        };
        let border = player.border_tiles();
        let map = game.map();
        let mut seen = BTreeSet::new();
        let mut clusters = Vec::new();
        for &start in border {
            if !seen.insert(start) {
                continue;
            }
            let mut cluster = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            while let Some(tile) = queue.pop_front() {
                cluster.insert(tile);
                for n in map.neighbors_with_diagonals(tile) {
                    if border.contains(&n) && seen.insert(n) {
                        queue.push_back(n);
                    }
                }
            }
            clusters.push(cluster);
        }
        // stable sort keeps discovery order among equal sizes
        clusters.sort_by_key(|c| std::cmp::Reverse(c.len()));
        clusters
    }

    /// The single player enclosing the cluster on every side, if any
    fn surrounded_by_single_player(
        &self,
        game: &Game,
        cluster: &BTreeSet<TileRef>,
    ) -> Option<PlayerId> {
        let map = game.map();
        let mut enemies = BTreeSet::new();
        for &tile in cluster {
            if map.is_ocean_shore(tile)
                || map.is_on_edge_of_map(tile)
                || map.neighbors(tile).any(|n| !map.has_owner(n))
            {
                return None;
            }
            enemies.extend(
                map.neighbors(tile)
                    .map(|n| map.owner(n))
                    .filter(|&o| o != Owner::Player(self.player)),
            );
            if enemies.len() > 1 {
                return None;
            }
        }
        let enemy = enemies.into_iter().next()?.player()?;
        let enemy_box = BoundingBox::of(map, game.player(enemy)?.border_tiles())?;
        let cluster_box = BoundingBox::of(map, cluster)?;
        enemy_box.contains(&cluster_box).then_some(enemy)
    }

    fn is_enclosed(&self, game: &Game, cluster: &BTreeSet<TileRef>) -> bool {
        let map = game.map();
        let mut enemy_tiles = BTreeSet::new();
        for &tile in cluster {
            if map.is_shore(tile) || map.is_on_edge_of_map(tile) {
                return false;
            }
            enemy_tiles.extend(map.neighbors(tile).filter(|&n| {
                let owner = map.owner(n);
                owner.is_player() && owner != Owner::Player(self.player)
            }));
        }
        match (
            BoundingBox::of(map, &enemy_tiles),
            BoundingBox::of(map, cluster),
        ) {
            (Some(enemy_box), Some(cluster_box)) => enemy_box.contains(&cluster_box),
            _ => false,
        }
    }

    /// Hostile neighbor pushing the largest attack, else the most common neighbor
    fn capturing_player(&self, game: &Game, cluster: &BTreeSet<TileRef>) -> Option<PlayerId> {
        let map = game.map();
        let mut neighbor_counts: BTreeMap<Owner, usize> = BTreeMap::new();
        for &tile in cluster {
            for n in map.neighbors(tile) {
                let owner = map.owner(n);
                if owner != Owner::Player(self.player) {
                    *neighbor_counts.entry(owner).or_default() += 1;
                }
            }
        }

        let mut best: Option<(PlayerId, f64)> = None;
        for &owner in neighbor_counts.keys() {
            let Some(neighbor) = owner.player() else {
                continue;
            };
            if game.is_friendly(self.player, neighbor) {
                continue;
            }
            for id in game.outgoing_attacks(neighbor) {
                let Some(attack) = game.attack(id) else {
                    continue;
                };
                if attack.target() != Owner::Player(self.player) {
                    continue;
                }
                if best.map_or(true, |(_, troops)| attack.troops() > troops) {
                    best = Some((neighbor, attack.troops()));
                }
            }
        }
        if let Some((player, _)) = best {
            return Some(player);
        }

        neighbor_counts
            .into_iter()
            .max_by_key(|&(owner, count)| (count, std::cmp::Reverse(owner)))
            .and_then(|(owner, _)| owner.player())
    }

    fn remove_cluster(&self, game: &mut Game, cluster: &BTreeSet<TileRef>) {
        // earlier removals this pass may already have moved these tiles
        if cluster
            .iter()
            .any(|&t| game.map().owner(t) != Owner::Player(self.player))
        {
            return;
        }
        let Some(capturer) = self.capturing_player(game, cluster) else {
            return;
        };
        let Some(&first) = cluster.iter().next() else {
            return;
        };
        let owner = Owner::Player(self.player);
        let tiles = game.map().bfs(first, |map, t| map.owner(t) == owner);

        let Some((owned, name)) = game
            .player(self.player)
            .map(|p| (p.num_tiles_owned(), p.name().to_string()))
        else {
            return;
        };
        if owned == tiles.len() {
            let gold = game.transfer_gold(self.player, capturer);
            game.stats_mut().gold_war(capturer, gold);
            game.display_message(
                format!("Conquered {}, received {} gold", name, gold),
                MessageSeverity::Success,
                Some(capturer),
            );
        }
        tracing::debug!(player = ?self.player, ?capturer, tiles = tiles.len(), "encircled cluster captured");
        for tile in tiles {
            game.conquer(capturer, tile);
        }
    }

    fn remove_clusters(&self, game: &mut Game) {
        let mut clusters = self.clusters(game).into_iter();
        let Some(main) = clusters.next() else {
            return;
        };
        if let Some(enemy) = self.surrounded_by_single_player(game, &main) {
            if !game.is_friendly(self.player, enemy) {
                self.remove_cluster(game, &main);
            }
        }
        for cluster in clusters {
            if self.is_enclosed(game, &cluster) {
                self.remove_cluster(game, &cluster);
            }
        }
    }
}

impl Executable for PlayerExecution {
    fn init(&mut self, game: &mut Game, tick: Tick) {
        let Some(name) = game.player(self.player).map(|p| p.name().to_string()) else {
            tracing::warn!(player = ?self.player, "upkeep for unknown player");
            self.active = false;
            return;
        };
        // spread the cluster sweeps of different players over ticks
        self.last_cluster_check = tick + simple_hash(&name) % game.settings().cluster_check_interval;
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let decay = game.settings().relation_decay_per_tick;
        let Some(player) = game.player_mut(self.player) else {
            self.active = false;
            return;
        };
        player.decay_relations(decay);

        self.capture_or_drop_stranded_units(game);

        if !game.player(self.player).is_some_and(Player::is_alive) {
            for id in game.units_of(self.player, &[]) {
                if game.unit(id).is_some_and(|u| !u.unit_type().is_nuke()) {
                    game.remove_unit(id);
                }
            }
            tracing::info!(player = ?self.player, "player eliminated");
            self.active = false;
            return;
        }

        let disconnected = game.player(self.player).is_some_and(Player::is_disconnected);
        if disconnected && game.settings().game_mode == GameMode::Team {
            if let Some(heir) = self.closest_teammate(game) {
                self.give_everything_to(game, heir);
            }
            return;
        }

        self.grow(game);
        self.expire_agreements(game);

        let interval = game.settings().cluster_check_interval;
        let last_change = game
            .player(self.player)
            .map(Player::last_tile_change)
            .unwrap_or(0);
        if tick.saturating_sub(self.last_cluster_check) > interval
            && last_change > self.last_cluster_check
        {
            self.last_cluster_check = tick;
            self.remove_clusters(game);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
