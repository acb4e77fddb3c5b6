use rskoe_sheet::constants::RUNE_TOKEN_CAP;
use rskoe_sheet::{
    CharacterSheet, ClanBank, PrayerSlot, PrayerSlotStatus, ResourceId, ResourceSet, SheetError,
    SkillId, SkillLedger,
};

#[test]
fn sheet_snapshot_roundtrips_exactly() {
    let sheet = CharacterSheet::new("Guthix")
        .apply_xp_delta(SkillId::Summoning, 21)
        .apply_xp_delta(SkillId::Prayer, 13)
        .set_side_quests(6)
        .unwrap()
        .adjust_wounds(4)
        .set_resource_count(ResourceId::Fish, 5)
        .unwrap();
    let text = serde_json::to_string(&sheet).unwrap();
    let parsed: CharacterSheet = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, sheet);
    assert_eq!(parsed.summoning_tokens(), 3);
    assert_eq!(parsed.wounds(), 4);
}

#[test]
fn loaded_sheet_is_brought_within_rule_limits() {
    let mut json = serde_json::to_value(CharacterSheet::default()).unwrap();
    json["prayerTokens"]["slot3"] = serde_json::json!("active");
    json["availableSummoningTokens"] = serde_json::json!(3);
    json["wounds"] = serde_json::json!(9);
    json["availableRuneTokens"] = serde_json::json!(50);

    let sheet: CharacterSheet = serde_json::from_value(json).unwrap();
    assert_eq!(sheet.level(SkillId::Prayer), 0);
    assert_eq!(
        sheet.prayer_tokens().status(PrayerSlot::Slot3),
        PrayerSlotStatus::Unavailable
    );
    assert_eq!(sheet.summoning_tokens(), 0);
    assert_eq!(sheet.wounds(), sheet.max_wounds());
    assert_eq!(sheet.rune_tokens(), RUNE_TOKEN_CAP);

    // Operations that skip the derivation pass start from the clamped state.
    assert_eq!(sheet.adjust_rune_tokens(0).rune_tokens(), RUNE_TOKEN_CAP);
    assert!(sheet.toggle_prayer_slot(PrayerSlot::Slot3).is_err());
}

#[test]
fn loading_keeps_unlocked_slots_the_levels_allow() {
    let sheet = CharacterSheet::default()
        .apply_xp_delta(SkillId::Prayer, 12)
        .toggle_prayer_slot(PrayerSlot::Slot2)
        .unwrap();
    let text = serde_json::to_string(&sheet).unwrap();
    let loaded: CharacterSheet = serde_json::from_str(&text).unwrap();
    assert_eq!(
        loaded.prayer_tokens().status(PrayerSlot::Slot2),
        PrayerSlotStatus::Active
    );
    assert_eq!(loaded, sheet);
}

#[test]
fn sheet_missing_a_skill_is_rejected() {
    let mut json = serde_json::to_value(CharacterSheet::default()).unwrap();
    json["skills"]
        .as_object_mut()
        .unwrap()
        .remove("runecrafting");
    let err = serde_json::from_value::<CharacterSheet>(json).unwrap_err();
    assert!(err.to_string().contains("skill ledger is missing"));
}

#[test]
fn sheet_with_bank_only_resources_is_rejected_when_partial() {
    let mut json = serde_json::to_value(CharacterSheet::default()).unwrap();
    json["resources"]["lobster"] = serde_json::json!(1);
    let err = serde_json::from_value::<CharacterSheet>(json).unwrap_err();
    assert!(
        err.to_string()
            .contains(&SheetError::IncompleteResourcePool.to_string())
    );
}

#[test]
fn older_bank_documents_gain_prepared_goods() {
    let json = serde_json::json!({
        "resources": {
            "fish": 1, "wood": 0, "meat": 0, "stone": 0, "herb": 0, "leather": 0,
            "vegetable": 0, "thread": 0, "egg": 0, "metal": 0, "flour": 0, "fruit": 2
        },
        "lastUpdated": "2024-03-01T10:00:00Z"
    });
    let bank: ClanBank = serde_json::from_value(json).unwrap();
    assert_eq!(bank.resources.set(), ResourceSet::Standard);
    let bank = bank.apply_bank_delta(ResourceId::Ration, 2);
    assert_eq!(bank.resources.set(), ResourceSet::Extended);
    assert_eq!(bank.count(ResourceId::Ration), 2);
    assert_eq!(bank.count(ResourceId::Fruit), 2);
    assert!(bank.last_updated.is_some());
}

#[test]
fn ledger_json_is_keyed_by_skill_name() {
    let json = serde_json::to_value(SkillLedger::default()).unwrap();
    for skill in SkillId::ALL {
        assert!(json.get(skill.as_str()).is_some(), "{skill}");
    }
}
