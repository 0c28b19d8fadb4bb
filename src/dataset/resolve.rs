//! Map ingredient ids to names.

use std::collections::{BTreeMap, HashMap};

use super::{Cocktail, CocktailProfile, Ingredient, IngredientId};
use crate::error::{Error, Result};

/// Separator between ingredient names in a resolved string.
pub const NAME_SEPARATOR: &str = ", ";

/// Build the id → name lookup used by the resolver.
///
/// The ingredients table repeats an ingredient once per occurrence. Rows are
/// deduplicated and the first surviving row for an id supplies the name;
/// since deduplication keeps first occurrences, that is the first row with
/// the id in table order.
pub fn name_lookup(ingredients: &[Ingredient]) -> HashMap<IngredientId, &str> {
    let mut lookup = HashMap::with_capacity(ingredients.len());
    for ingredient in ingredients {
        lookup.entry(ingredient.id).or_insert(ingredient.name.as_str());
    }
    lookup
}

/// Resolve every cocktail's id list into a `", "`-joined name string.
///
/// Output has one string per id list, in the same order; names follow the
/// id order. An empty id list yields an empty string.
///
/// # Errors
///
/// [`Error::IngredientNotFound`] for the first id with no ingredient row.
pub fn resolve_names(
    ingredients: &[Ingredient],
    id_lists: &[Vec<IngredientId>],
) -> Result<Vec<String>> {
    let lookup = name_lookup(ingredients);

    let names = id_lists
        .iter()
        .enumerate()
        .map(|(cocktail, ids)| {
            let resolved = ids
                .iter()
                .map(|id| {
                    lookup
                        .get(id)
                        .copied()
                        .ok_or(Error::IngredientNotFound { cocktail, id: *id })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(resolved.join(NAME_SEPARATOR))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        cocktails = names.len(),
        distinct_ingredients = lookup.len(),
        "resolved ingredient names"
    );
    Ok(names)
}

/// Pair each cocktail's name with its resolved ingredient string.
pub fn profiles(
    cocktails: &[Cocktail],
    ingredients: &[Ingredient],
) -> Result<Vec<CocktailProfile>> {
    let id_lists: Vec<Vec<IngredientId>> =
        cocktails.iter().map(|c| c.ingredients_id.clone()).collect();
    let names = resolve_names(ingredients, &id_lists)?;

    Ok(cocktails
        .iter()
        .zip(names)
        .map(|(c, ingredients)| CocktailProfile::new(c.name.clone(), ingredients))
        .collect())
}

/// Count how often each ingredient is used across all cocktails.
///
/// Repeated ids within one recipe count once per occurrence.
pub fn ingredient_counts(
    cocktails: &[Cocktail],
    ingredients: &[Ingredient],
) -> Result<BTreeMap<String, usize>> {
    let lookup = name_lookup(ingredients);
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for (row, cocktail) in cocktails.iter().enumerate() {
        for id in &cocktail.ingredients_id {
            let name = lookup
                .get(id)
                .ok_or(Error::IngredientNotFound { cocktail: row, id: *id })?;
            *counts.entry((*name).to_string()).or_default() += 1;
        }
    }

    Ok(counts)
}
