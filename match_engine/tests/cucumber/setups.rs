use cucumber::given;
use match_engine::{helpers::Clock, test_utils::seed::{seed_account, seed_group}};

use crate::cucumber::{match_world::MatchSystem, MatchWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut MatchWorld) {
    let system = MatchSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "{word} and {word} are members of '{word}'")]
async fn members(world: &mut MatchWorld, a: String, b: String, group: String) {
    seed_group(world.api().db(), &group, &[a.as_str(), b.as_str()]).await;
}

#[given(expr = "{word} has {int} credit(s)")]
async fn funded(world: &mut MatchWorld, user: String, credits: i64) {
    let now = world.clock().now();
    seed_account(world.api().db(), &user, credits, None, now).await;
}

#[given(expr = "{word} is premium for {int} days")]
async fn premium(world: &mut MatchWorld, user: String, days: i64) {
    let now = world.clock().now();
    seed_account(world.api().db(), &user, 0, Some(now + chrono::Duration::days(days)), now).await;
}
