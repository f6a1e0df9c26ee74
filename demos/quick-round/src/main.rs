use imposter::prelude::*;
use imposter::protocol::{Codec, JsonCodec};

// ---------------------------------------------------------------------------
// Word catalog
// ---------------------------------------------------------------------------

const CATALOG: &str = r#"{
    "animals": ["otter", "lynx", "heron", "badger", "gecko", "walrus", "ibis",
                "marmot", "tapir", "okapi", "puffin", "stoat", "yak", "newt",
                "koala", "bison"],
    "kitchen": ["whisk", "ladle", "colander", "skillet", "grater", "peeler",
                "kettle", "toaster", "spatula", "tongs", "sieve", "mortar",
                "rolling pin", "teapot", "blender", "cleaver"],
    "weather": ["drizzle", "hail", "fog", "monsoon", "breeze", "sleet"]
}"#;

fn picked() -> Vec<String> {
    vec!["animals".into(), "kitchen".into()]
}

fn token_of(url: &str) -> PlayerToken {
    PlayerToken::new(url.rsplit('/').next().unwrap_or_default())
}

fn show(label: &str, card: &RevealCard) -> Result<(), ImposterError> {
    let json = String::from_utf8_lossy(&JsonCodec.encode(card)?).into_owned();
    println!("  {label:<6} {json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// Everyone's name is typed in up front; each player gets a link.
async fn anonymous_round(game: &Imposter) -> Result<(), ImposterError> {
    let created = game
        .create_anonymous_session(
            vec!["Ana".into(), "Ben".into(), "Cleo".into(), "Dev".into()],
            picked(),
        )
        .await?;
    println!("anonymous session {}", created.slug);

    for link in &created.players {
        println!("  {} -> {}", link.name, link.url);
    }
    for link in &created.players {
        let player = PlayerRef::Token(token_of(&link.url));
        show(&link.name, &game.reveal(&created.slug, &player).await?)?;
    }

    // A second visit never shows the word again.
    let first = PlayerRef::Token(token_of(&created.players[0].url));
    show("again", &game.reveal(&created.slug, &first).await?)?;
    Ok(())
}

/// A moderator opens a lobby, players join with the code, the moderator
/// starts the round.
async fn code_round(game: &Imposter) -> Result<(), ImposterError> {
    let host = UserId(1);
    let created = game
        .create_code_session(Identity::new(host, "Host"))
        .await?;
    println!("code session {} (join code {})", created.slug, created.join_code);

    let mut seats = Vec::new();
    for (i, name) in ["Eli", "Fay", "Gus", "Hana", "Ivo", "Jun"].into_iter().enumerate() {
        let joined = game
            .join_code_session(created.join_code.as_str(), Identity::new(UserId(10 + i as u64), name))
            .await?;
        seats.push((name, joined.player_id));
    }
    game.post_message(&created.slug, Some("Host"), "starting in a sec")
        .await?;

    let started = game
        .start_code_session(&created.slug, host, picked(), 2)
        .await?;
    println!(
        "  started with {} imposter(s), word {:?}",
        started.imposter_count, started.word
    );

    for (name, id) in &seats {
        show(name, &game.reveal(&created.slug, &PlayerRef::Id(*id)).await?)?;
    }

    let dashboard = game.moderator_dashboard(&created.slug, host).await?;
    println!(
        "  dashboard: {}",
        String::from_utf8_lossy(&game.to_json(&dashboard)?)
    );
    for message in game.list_messages(&created.slug).await? {
        println!("  [{}] {}", message.sender, message.body);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), ImposterError> {
    imposter::init_tracing("imposter=info,imposter_game=info");

    let game = Imposter::builder()
        .catalog(WordCatalog::from_json_str(CATALOG)?)
        .build(MemoryStore::new());
    tracing::info!(categories = game.categories().len(), "catalog loaded");

    anonymous_round(&game).await?;
    code_round(&game).await?;
    Ok(())
}
