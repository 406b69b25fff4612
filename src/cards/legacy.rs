//! Legacy card data adapter.
//!
//! Early Lirya card files carry no structured ability data, only Italian
//! rules text ("Quando entra in gioco, infligge 2 danni a un nemico").
//! This module translates that format into the structured model at load
//! time, so the interpreter never sees free text. The keyword tables below
//! are the complete set of phrasings that appear in the old card pool.
//!
//! The classification half (`classify_text`) is also the registry's
//! fallback for abilities that declare neither a kind nor a trigger.

use log::warn;
use serde::Deserialize;

use crate::cards::{
    AbilityDefinition, AbilityKind, CardClass, CardDefinition, CardKind, Element, Keyword, Rarity,
    TriggerName,
};
use crate::effects::{Duration, EffectDef, StatKind, TargetSpec};

/// A card in the legacy JSON shape.
#[derive(Clone, Debug, Deserialize)]
pub struct LegacyCard {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub cost: i32,
    #[serde(default)]
    pub attack: Option<i32>,
    #[serde(default)]
    pub defense: Option<i32>,
    #[serde(default)]
    pub health: Option<i32>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub abilities: Vec<LegacyAbility>,
    /// Spells carry their rules text here instead of an ability list.
    #[serde(default)]
    pub description: Option<String>,
}

/// An ability in the legacy JSON shape: a name and free text.
#[derive(Clone, Debug, Deserialize)]
pub struct LegacyAbility {
    pub name: String,
    #[serde(default, alias = "description")]
    pub effect: Option<String>,
}

/// Result of classifying legacy rules text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextClassification {
    pub kind: AbilityKind,
    pub trigger: Option<TriggerName>,
    pub cost: Option<i32>,
    pub once_per_turn: bool,
}

/// Classify rules text into an ability kind.
///
/// Trigger phrases are checked first, then activation markers, then aura
/// markers; anything else is passive.
#[must_use]
pub fn classify_text(text: &str) -> TextClassification {
    let text = text.to_lowercase();

    let triggered = |trigger| TextClassification {
        kind: AbilityKind::Triggered,
        trigger: Some(trigger),
        cost: None,
        once_per_turn: false,
    };

    if text.contains("quando entra in gioco") || text.contains("quando viene evocato") {
        return triggered(TriggerName::OnEnterPlay);
    }
    if text.contains("quando viene attaccato") {
        return triggered(TriggerName::OnDamageTaken);
    }
    if text.contains("quando attacca") {
        return triggered(TriggerName::OnAttack);
    }
    if text.contains("quando giochi un incantesimo") {
        return triggered(TriggerName::OnSpellPlayed);
    }
    if text.contains("quando evochi una struttura") {
        return triggered(TriggerName::OnStructureBuilt);
    }
    if text.contains("all'inizio del tuo turno") || text.contains("all'inizio del turno") {
        return triggered(TriggerName::OnTurnStart);
    }
    if text.contains("alla fine del turno") && !text.contains("fino alla fine del turno") {
        return triggered(TriggerName::OnTurnEnd);
    }
    if text.contains("quando muore") {
        return triggered(TriggerName::OnDeath);
    }

    if text.contains("una volta per turno") || text.contains("puoi ") || text.contains("paga ") {
        return TextClassification {
            kind: AbilityKind::Activated,
            trigger: None,
            cost: number_after(&text, "paga "),
            once_per_turn: text.contains("una volta per turno"),
        };
    }

    if (text.contains("tutti") && (text.contains('+') || text.contains("ottengono")))
        || text.contains("finché")
    {
        return TextClassification {
            kind: AbilityKind::Aura,
            trigger: None,
            cost: None,
            once_per_turn: false,
        };
    }

    TextClassification {
        kind: AbilityKind::Passive,
        trigger: None,
        cost: None,
        once_per_turn: false,
    }
}

/// Translate rules text into structured effects. Unrecognized phrasings
/// produce nothing (the ability becomes inert, which matches how the old
/// engine ignored text it could not match).
#[must_use]
pub fn parse_effects(text: &str) -> Vec<EffectDef> {
    let text = text.to_lowercase();
    let mut effects = Vec::new();

    // Direct damage: "infligge N danni [a tutti i nemici]"
    if let Some(value) = number_after(&text, "infligge ") {
        if text.contains("dann") {
            let target = if text.contains("tutti i nemici") {
                TargetSpec::AllEnemies
            } else if text.contains("casuale") {
                TargetSpec::RandomEnemy
            } else {
                TargetSpec::TargetEnemy
            };
            effects.push(EffectDef::damage(value, target));
        }
    }

    // Healing: "cura N" / "rigenera N"
    let heal = number_after(&text, "cura ").or_else(|| number_after(&text, "rigenera "));
    if let Some(value) = heal {
        let target = if text.contains("tutti") { TargetSpec::AllAllies } else { TargetSpec::Target };
        effects.push(EffectDef::heal(value, target));
    }

    // Card draw: "pesca N carte" / "pesca una carta"
    if text.contains("pesca") && text.contains("cart") {
        let value = number_after(&text, "pesca ").unwrap_or(1);
        effects.push(EffectDef::draw_card(value));
    }

    // Energy: "guadagni N energia"
    if let Some(value) = number_after(&text, "guadagni ") {
        if text.contains("energia") {
            effects.push(EffectDef::gain_energy(value));
        }
    }

    // Self buff: "guadagna +N ATT/DIF [fino alla fine del turno]"
    if text.contains("guadagna +") {
        let duration = if text.contains("fino alla fine del turno") {
            Duration::UntilEndOfTurn
        } else {
            Duration::Permanent
        };
        if let Some((stat, value)) = parse_single_buff(&text, "guadagna +") {
            effects.push(EffectDef::StatModifier {
                stat,
                value,
                target: TargetSpec::Self_,
                filter: None,
                duration,
                condition: None,
                per: None,
            });
        }
    }

    // Group buff: "tutti ... +A/+D"
    if text.contains("tutti") {
        if let Some((attack, defense)) = parse_buff_pair(&text) {
            if attack == defense {
                effects.push(EffectDef::stat_modifier(
                    StatKind::Both,
                    attack,
                    TargetSpec::AllAllies,
                ));
            } else {
                effects.push(EffectDef::stat_modifier(
                    StatKind::Attack,
                    attack,
                    TargetSpec::AllAllies,
                ));
                effects.push(EffectDef::stat_modifier(
                    StatKind::Defense,
                    defense,
                    TargetSpec::AllAllies,
                ));
            }
        }
    }

    // Attacker debuff: "l'attaccante perde N ATT/DIF"
    if text.contains("attaccante perde") {
        if let Some((stat, value)) = parse_single_buff(&text, "perde ") {
            effects.push(EffectDef::StatModifier {
                stat,
                value: -value,
                target: TargetSpec::Target,
                filter: None,
                duration: Duration::UntilEndOfTurn,
                condition: None,
                per: None,
            });
        }
    }

    // Damage reduction: "riduce di N tutti i danni"
    if let Some(value) = number_after(&text, "riduce di ") {
        if text.contains("dann") {
            effects.push(EffectDef::AbilityGrant {
                ability: Keyword::DamageReduction,
                target: TargetSpec::Self_,
                value,
                filter: None,
                duration: Duration::Permanent,
            });
        }
    }

    // Capability keywords.
    if text.contains("può cambiare linea senza costi") {
        effects.push(EffectDef::grant(Keyword::FreeMovement, TargetSpec::Self_));
    }
    if text.contains("può attaccare nello stesso turno") {
        effects.push(EffectDef::grant(Keyword::Haste, TargetSpec::Self_));
    }
    if text.contains("può attaccare la seconda linea") {
        effects.push(EffectDef::grant(Keyword::Reach, TargetSpec::Self_));
    }

    // Removal: "distruggi"
    if text.contains("distruggi") {
        effects.push(EffectDef::Destroy { target: TargetSpec::Target, filter: None });
    }

    // Deck peek: "guarda la prima carta" / "guarda le prime N carte"
    if text.contains("guarda la prima carta") {
        effects.push(EffectDef::LookAtCards { value: 1 });
    } else if text.contains("guarda le prime") {
        let value = number_after(&text, "guarda le prime ").unwrap_or(1);
        effects.push(EffectDef::LookAtCards { value });
    }

    effects
}

/// Translate a legacy ability into the structured model.
#[must_use]
pub fn translate_ability(legacy: &LegacyAbility) -> AbilityDefinition {
    let text = legacy.effect.clone().unwrap_or_default();
    let classification = classify_text(&text);

    AbilityDefinition {
        name: legacy.name.clone(),
        kind: Some(classification.kind),
        trigger: classification.trigger.map(|t| t.canonical_name().to_string()),
        effects: parse_effects(&text),
        cost: classification.cost,
        limit: classification
            .once_per_turn
            .then_some(crate::cards::UsageLimit::OncePerTurn),
        text: legacy.effect.clone(),
    }
}

/// Translate a whole legacy card.
#[must_use]
pub fn translate_card(legacy: &LegacyCard) -> CardDefinition {
    let kind = match legacy.kind.as_str() {
        "Personaggio" | "Character" => CardKind::Character,
        "Incantesimo" | "Spell" => CardKind::Spell,
        "Struttura" | "Structure" => CardKind::Structure,
        "Equipaggiamento" | "Equipment" => CardKind::Equipment,
        other => {
            warn!("unknown card type '{other}' on '{}', treating as spell", legacy.name);
            CardKind::Spell
        }
    };

    let mut card = CardDefinition::new(&legacy.name, kind, legacy.cost).with_stats(
        legacy.attack.unwrap_or(0),
        legacy.defense.unwrap_or(0),
        legacy.health.unwrap_or(0),
    );

    if let Some(class) = legacy.class.as_deref().and_then(translate_class) {
        card = card.with_class(class);
    }
    if let Some(element) = legacy.element.as_deref().and_then(translate_element) {
        card = card.with_element(element);
    }
    if let Some(rarity) = legacy.rarity.as_deref().and_then(translate_rarity) {
        card = card.with_rarity(rarity);
    }

    for ability in &legacy.abilities {
        card = card.with_ability(translate_ability(ability));
    }

    // Spell text lives in the description; model it as an on-play ability.
    if kind == CardKind::Spell {
        if let Some(description) = &legacy.description {
            let effects = parse_effects(description);
            if !effects.is_empty() {
                let mut ability = AbilityDefinition::new(&legacy.name, AbilityKind::Triggered)
                    .with_trigger("on_play");
                ability.effects = effects;
                ability.text = Some(description.clone());
                card = card.with_ability(ability);
            }
        }
    }

    card
}

fn translate_class(name: &str) -> Option<CardClass> {
    match name {
        "Guerriero" | "Warrior" => Some(CardClass::Warrior),
        "Mago" | "Mage" => Some(CardClass::Mage),
        "Ranger" => Some(CardClass::Ranger),
        "Chierico" | "Cleric" => Some(CardClass::Cleric),
        other => {
            warn!("unknown character class '{other}'");
            None
        }
    }
}

fn translate_element(name: &str) -> Option<Element> {
    match name {
        "Fuoco" | "Fire" => Some(Element::Fire),
        "Acqua" | "Water" => Some(Element::Water),
        "Terra" | "Earth" => Some(Element::Earth),
        "Aria" | "Air" => Some(Element::Air),
        "Luce" | "Light" => Some(Element::Light),
        "Ombra" | "Shadow" => Some(Element::Shadow),
        other => {
            warn!("unknown element '{other}'");
            None
        }
    }
}

fn translate_rarity(name: &str) -> Option<Rarity> {
    match name {
        "Comune" | "Common" => Some(Rarity::Common),
        "Non Comune" | "Uncommon" => Some(Rarity::Uncommon),
        "Rara" | "Rare" => Some(Rarity::Rare),
        "Leggendaria" | "Legendary" => Some(Rarity::Legendary),
        other => {
            warn!("unknown rarity '{other}'");
            None
        }
    }
}

/// First integer appearing shortly after `keyword` in `text`.
fn number_after(text: &str, keyword: &str) -> Option<i32> {
    let idx = text.find(keyword)?;
    let rest = &text[idx + keyword.len()..];

    // Char-based window: byte slicing would split accented words.
    let digits: String = rest
        .chars()
        .take(16)
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();

    digits.parse().ok()
}

/// Parse "`prefix`N ATT" / "`prefix`N DIF" into (stat, N).
fn parse_single_buff(text: &str, prefix: &str) -> Option<(StatKind, i32)> {
    let value = number_after(text, prefix)?;
    let idx = text.find(prefix)?;
    let window: String = text[idx..].chars().take(24).collect();

    if window.contains("att") {
        Some((StatKind::Attack, value))
    } else if window.contains("dif") {
        Some((StatKind::Defense, value))
    } else {
        None
    }
}

/// Parse the first "+A/+D" pair in the text.
fn parse_buff_pair(text: &str) -> Option<(i32, i32)> {
    let mut search = text;
    while let Some(idx) = search.find('+') {
        let rest = &search[idx + 1..];
        let first: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if !first.is_empty() {
            let after = &rest[first.len()..];
            if let Some(tail) = after.strip_prefix("/+") {
                let second: String = tail.chars().take_while(char::is_ascii_digit).collect();
                if !second.is_empty() {
                    return Some((first.parse().ok()?, second.parse().ok()?));
                }
            }
        }
        search = &search[idx + 1..];
    }
    None
}
