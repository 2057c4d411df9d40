use std::collections::HashSet;

use super::*;
use crate::criteria::ALL_STATES;
use crate::palette::NetworkRegistry;

// -----------------------------------------------------------------------
// fixtures
// -----------------------------------------------------------------------

fn unit(name: Option<&str>, network: Option<&str>) -> Unit {
    Unit {
        name: name.map(str::to_owned),
        network: network.map(str::to_owned),
        ..Unit::default()
    }
}

fn sample_catalog() -> UnitCatalog {
    UnitCatalog::new(vec![
        Unit {
            name: Some("Mercado Barra".to_owned()),
            network: Some("Novo Mix".to_owned()),
            original_address: Some("Av. Oceânica, 10 - Salvador-BA".to_owned()),
            state: None,
            tax_id: Some("12.345.678/0001-90".to_owned()),
            latitude: Some(-13.01),
            longitude: Some(-38.53),
        },
        Unit {
            name: Some("Hiper Pituba".to_owned()),
            network: Some("Hiperideal".to_owned()),
            original_address: Some("Rua das Flores, 5, Salvador".to_owned()),
            state: Some("ba".to_owned()),
            tax_id: Some("98.765.432/0001-10".to_owned()),
            latitude: Some(-12.99),
            longitude: Some(-38.45),
        },
        Unit {
            name: Some("Mix Aracaju".to_owned()),
            network: Some("Rede Mix".to_owned()),
            original_address: Some("Av. Beira Mar, 200 - Aracaju-SE".to_owned()),
            state: Some("SE".to_owned()),
            tax_id: Some("11.222.333/0001-44".to_owned()),
            latitude: None,
            longitude: Some(-37.05),
        },
        Unit {
            name: None,
            network: Some("Novo Mix".to_owned()),
            original_address: None,
            state: None,
            tax_id: None,
            latitude: None,
            longitude: None,
        },
        Unit {
            name: Some("Sem Rede".to_owned()),
            network: None,
            original_address: Some("Rua Y - Salvador-BA".to_owned()),
            state: Some("BA".to_owned()),
            tax_id: Some("12.345.000/0001-00".to_owned()),
            latitude: Some(-12.9),
            longitude: Some(-38.4),
        },
    ])
}

fn sample_registry() -> NetworkRegistry {
    NetworkRegistry::new(["Hiperideal", "Novo Mix", "Rede Mix"])
}

fn default_criteria() -> FilterCriteria {
    FilterCriteria::defaults_for(&sample_registry())
}

fn names(units: &[&Unit]) -> Vec<Option<String>> {
    units.iter().map(|u| u.name.clone()).collect()
}

fn as_set(units: &[&Unit]) -> HashSet<*const Unit> {
    units.iter().map(|u| std::ptr::from_ref::<Unit>(u)).collect()
}

// -----------------------------------------------------------------------
// network
// -----------------------------------------------------------------------

#[test]
fn default_criteria_show_every_unit_with_a_known_network() {
    let catalog = sample_catalog();
    let visible = filter_units(&catalog, &default_criteria());
    assert_eq!(visible.len(), 4);
    assert!(visible.iter().all(|u| u.network.is_some()));
}

#[test]
fn blank_network_listed_by_backend_is_selected_by_default() {
    let registry = NetworkRegistry::new(["", "Novo Mix"]);
    let catalog = UnitCatalog::new(vec![
        unit(Some("Loja Sem Bandeira"), Some("")),
        unit(Some("Mix"), Some("Novo Mix")),
    ]);
    let mut criteria = FilterCriteria::defaults_for(&registry);

    assert_eq!(filter_units(&catalog, &criteria).len(), 2);

    criteria.set_network("", false);
    assert_eq!(
        names(&filter_units(&catalog, &criteria)),
        [Some("Mix".to_owned())]
    );

    criteria.reset(&registry);
    assert_eq!(filter_units(&catalog, &criteria).len(), 2);
}

#[test]
fn empty_network_selection_shows_nothing() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.selected_networks.clear();
    assert!(filter_units(&catalog, &criteria).is_empty());

    criteria.name_substring = "mercado".to_owned();
    criteria.state = "BA".to_owned();
    assert!(filter_units(&catalog, &criteria).is_empty());
}

#[test]
fn network_match_is_exact_and_case_sensitive() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.selected_networks = HashSet::from(["novo mix".to_owned()]);
    assert!(filter_units(&catalog, &criteria).is_empty());

    criteria.selected_networks = HashSet::from(["Novo Mix".to_owned()]);
    let visible = filter_units(&catalog, &criteria);
    assert_eq!(visible.len(), 2);
    assert!(visible
        .iter()
        .all(|u| u.network.as_deref() == Some("Novo Mix")));
}

#[test]
fn unchecking_a_network_hides_its_units() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.set_network("Hiperideal", false);
    let visible = filter_units(&catalog, &criteria);
    assert!(visible
        .iter()
        .all(|u| u.network.as_deref() != Some("Hiperideal")));
    assert_eq!(visible.len(), 3);
}

// -----------------------------------------------------------------------
// state
// -----------------------------------------------------------------------

#[test]
fn state_all_disables_state_filter() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.state = ALL_STATES.to_owned();
    assert_eq!(filter_units(&catalog, &criteria).len(), 4);
}

#[test]
fn state_matches_explicit_field_case_insensitively() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.state = "SE".to_owned();
    assert_eq!(
        names(&filter_units(&catalog, &criteria)),
        vec![Some("Mix Aracaju".to_owned())]
    );
}

#[test]
fn state_falls_back_to_address_suffix() {
    let catalog = UnitCatalog::new(vec![Unit {
        name: Some("X".to_owned()),
        network: Some("Novo Mix".to_owned()),
        original_address: Some("Rua X, 123 - Salvador-BA".to_owned()),
        ..Unit::default()
    }]);
    let mut criteria = default_criteria();
    criteria.state = "BA".to_owned();
    assert_eq!(filter_units(&catalog, &criteria).len(), 1);
}

#[test]
fn state_filter_combines_field_and_address_matches() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.state = " ba ".to_owned();
    let mut got = names(&filter_units(&catalog, &criteria));
    got.sort();
    assert_eq!(
        got,
        vec![
            Some("Hiper Pituba".to_owned()),
            Some("Mercado Barra".to_owned())
        ]
    );
}

#[test]
fn state_filter_excludes_units_without_state_or_address() {
    let catalog = UnitCatalog::new(vec![unit(Some("Loja"), Some("Novo Mix"))]);
    let mut criteria = default_criteria();
    criteria.state = "BA".to_owned();
    assert!(filter_units(&catalog, &criteria).is_empty());
}

// -----------------------------------------------------------------------
// tax id
// -----------------------------------------------------------------------

#[test]
fn tax_id_is_a_verbatim_substring_match() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.tax_id_substring = "12.345".to_owned();
    assert_eq!(
        names(&filter_units(&catalog, &criteria)),
        vec![Some("Mercado Barra".to_owned())]
    );
}

#[test]
fn tax_id_match_is_case_sensitive() {
    let catalog = UnitCatalog::new(vec![Unit {
        name: Some("Exterior".to_owned()),
        network: Some("Novo Mix".to_owned()),
        tax_id: Some("AB-12.345".to_owned()),
        ..Unit::default()
    }]);
    let mut criteria = default_criteria();
    criteria.tax_id_substring = "ab-12.345".to_owned();
    assert!(filter_units(&catalog, &criteria).is_empty());

    criteria.tax_id_substring = "AB-12.345".to_owned();
    assert_eq!(filter_units(&catalog, &criteria).len(), 1);
}

#[test]
fn tax_id_filter_excludes_units_without_tax_id() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.tax_id_substring = "0001".to_owned();
    let visible = filter_units(&catalog, &criteria);
    assert_eq!(visible.len(), 3);
    assert!(visible.iter().all(|u| u.tax_id.is_some()));
}

// -----------------------------------------------------------------------
// name
// -----------------------------------------------------------------------

#[test]
fn name_match_ignores_case_and_surrounding_space() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.name_substring = "  PITUBA ".to_owned();
    assert_eq!(
        names(&filter_units(&catalog, &criteria)),
        vec![Some("Hiper Pituba".to_owned())]
    );
}

#[test]
fn name_filter_excludes_unnamed_units() {
    let catalog = sample_catalog();
    let mut criteria = default_criteria();
    criteria.name_substring = "m".to_owned();
    let visible = filter_units(&catalog, &criteria);
    assert!(visible.iter().all(|u| u.name.is_some()));
}

// -----------------------------------------------------------------------
// sort
// -----------------------------------------------------------------------

#[test]
fn name_asc_puts_absent_first_and_ignores_case() {
    let catalog = UnitCatalog::new(vec![
        unit(Some("Beta"), Some("Novo Mix")),
        unit(Some("alpha"), Some("Novo Mix")),
        unit(None, Some("Novo Mix")),
    ]);
    let visible = filter_units(&catalog, &default_criteria());
    assert_eq!(
        names(&visible),
        vec![None, Some("alpha".to_owned()), Some("Beta".to_owned())]
    );
}

#[test]
fn name_desc_puts_absent_last() {
    let catalog = UnitCatalog::new(vec![
        unit(Some("Beta"), Some("Novo Mix")),
        unit(None, Some("Novo Mix")),
        unit(Some("alpha"), Some("Novo Mix")),
    ]);
    let mut criteria = default_criteria();
    criteria.sort_mode = SortMode::NameDesc;
    assert_eq!(
        names(&filter_units(&catalog, &criteria)),
        vec![Some("Beta".to_owned()), Some("alpha".to_owned()), None]
    );
}

#[test]
fn network_sort_is_stable_in_both_directions() {
    let catalog = UnitCatalog::new(vec![
        unit(Some("n1"), Some("Novo Mix")),
        unit(Some("h1"), Some("Hiperideal")),
        unit(Some("n2"), Some("Novo Mix")),
        unit(Some("h2"), Some("Hiperideal")),
    ]);
    let mut criteria = default_criteria();

    criteria.sort_mode = SortMode::NetworkAsc;
    assert_eq!(
        names(&filter_units(&catalog, &criteria)),
        ["h1", "h2", "n1", "n2"].map(|s| Some(s.to_owned()))
    );

    criteria.sort_mode = SortMode::NetworkDesc;
    assert_eq!(
        names(&filter_units(&catalog, &criteria)),
        ["n1", "n2", "h1", "h2"].map(|s| Some(s.to_owned()))
    );
}

#[test]
fn accented_names_sort_with_their_base_letter() {
    let catalog = UnitCatalog::new(vec![
        unit(Some("Zona Sul"), Some("Novo Mix")),
        unit(Some("Água Fria"), Some("Novo Mix")),
        unit(Some("Barra"), Some("Novo Mix")),
    ]);
    assert_eq!(
        names(&filter_units(&catalog, &default_criteria())),
        ["Água Fria", "Barra", "Zona Sul"].map(|s| Some(s.to_owned()))
    );
}

// -----------------------------------------------------------------------
// composition properties
// -----------------------------------------------------------------------

#[test]
fn filtering_is_deterministic_and_does_not_mutate_catalog() {
    let catalog = sample_catalog();
    let before = catalog.units().to_vec();
    let mut criteria = default_criteria();
    criteria.state = "BA".to_owned();
    criteria.sort_mode = SortMode::NameDesc;

    let first = filter_units(&catalog, &criteria);
    let second = filter_units(&catalog, &criteria);
    assert_eq!(first, second);
    assert_eq!(catalog.units(), before.as_slice());
}

#[test]
fn result_is_the_intersection_of_single_criterion_results() {
    let catalog = sample_catalog();
    let base = default_criteria();

    let mut only_state = base.clone();
    only_state.state = "BA".to_owned();
    let mut only_tax = base.clone();
    only_tax.tax_id_substring = "0001".to_owned();
    let mut only_name = base.clone();
    only_name.name_substring = "mercado".to_owned();

    let mut all = base.clone();
    all.state = "BA".to_owned();
    all.tax_id_substring = "0001".to_owned();
    all.name_substring = "mercado".to_owned();

    let expected: HashSet<_> = as_set(&filter_units(&catalog, &only_state))
        .intersection(&as_set(&filter_units(&catalog, &only_tax)))
        .copied()
        .collect::<HashSet<_>>()
        .intersection(&as_set(&filter_units(&catalog, &only_name)))
        .copied()
        .collect();

    assert_eq!(as_set(&filter_units(&catalog, &all)), expected);
    assert_eq!(expected.len(), 1);
}

#[test]
fn relaxing_any_single_criterion_only_widens_the_result() {
    let catalog = sample_catalog();
    let mut strict = default_criteria();
    strict.set_network("Rede Mix", false);
    strict.state = "BA".to_owned();
    strict.tax_id_substring = "0001".to_owned();
    strict.name_substring = "a".to_owned();

    let strict_set = as_set(&filter_units(&catalog, &strict));

    let relaxations: Vec<Box<dyn Fn(&mut FilterCriteria)>> = vec![
        Box::new(|c: &mut FilterCriteria| c.selected_networks = default_criteria().selected_networks),
        Box::new(|c: &mut FilterCriteria| c.state = ALL_STATES.to_owned()),
        Box::new(|c: &mut FilterCriteria| c.tax_id_substring.clear()),
        Box::new(|c: &mut FilterCriteria| c.name_substring.clear()),
    ];

    for relax in relaxations {
        let mut wider = strict.clone();
        relax(&mut wider);
        let wider_set = as_set(&filter_units(&catalog, &wider));
        assert!(strict_set.is_subset(&wider_set));
    }
}

#[test]
fn degenerate_unit_never_panics() {
    let catalog = UnitCatalog::new(vec![Unit::default(), unit(Some("Ok"), Some("Novo Mix"))]);
    let mut criteria = default_criteria();
    for mode in [
        SortMode::NameAsc,
        SortMode::NameDesc,
        SortMode::NetworkAsc,
        SortMode::NetworkDesc,
    ] {
        criteria.sort_mode = mode;
        criteria.state = "BA".to_owned();
        criteria.tax_id_substring = "1".to_owned();
        criteria.name_substring = "o".to_owned();
        let _ = filter_units(&catalog, &criteria);
    }
    criteria.reset(&sample_registry());
    assert_eq!(filter_units(&catalog, &criteria).len(), 1);
}

#[test]
fn owned_variant_matches_borrowed_variant() {
    let catalog = sample_catalog();
    let criteria = default_criteria();
    let borrowed: Vec<Unit> = filter_units(&catalog, &criteria)
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(filter_units_owned(&catalog, &criteria), borrowed);
}
