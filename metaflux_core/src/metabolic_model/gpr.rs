//! Gene protein reaction rules, both as lists of isozymes and as a Boolean AST
//!
//! A reaction's gene association is a list of [`Isozyme`]s. The reaction can be catalyzed
//! if any one isozyme is available, and an isozyme is available only if none of its genes
//! have been knocked out. The [`Gpr`] tree is the form rules are parsed into, and can be
//! converted into the isozyme list form with [`Gpr::to_isozymes`].
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A single enzyme complex, all of its genes are needed for it to function
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Isozyme {
    /// Map of gene ids to the number of copies of the gene product in the complex
    pub gene_product_stoichiometry: IndexMap<String, f64>,
    /// Turnover number in the forward direction
    pub kcat_forward: Option<f64>,
    /// Turnover number in the backward direction
    pub kcat_backward: Option<f64>,
}

impl Isozyme {
    /// Create an isozyme requiring one copy of each of `genes`
    ///
    /// # Examples
    /// ```rust
    /// use metaflux_core::metabolic_model::gpr::Isozyme;
    /// let complex = Isozyme::new(["b0001", "b0002"]);
    /// assert_eq!(complex.genes().collect::<Vec<_>>(), vec!["b0001", "b0002"]);
    /// ```
    pub fn new<I, S>(genes: I) -> Isozyme
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Isozyme {
            gene_product_stoichiometry: genes.into_iter().map(|g| (g.into(), 1.)).collect(),
            kcat_forward: None,
            kcat_backward: None,
        }
    }

    /// Set the turnover numbers of the isozyme
    pub fn with_kcats(mut self, kcat_forward: f64, kcat_backward: f64) -> Isozyme {
        self.kcat_forward = Some(kcat_forward);
        self.kcat_backward = Some(kcat_backward);
        self
    }

    /// Ids of the genes needed by this isozyme
    pub fn genes(&self) -> impl Iterator<Item = &str> {
        self.gene_product_stoichiometry.keys().map(String::as_str)
    }

    /// Whether the isozyme still works after the genes in `knockouts` are removed
    ///
    /// An isozyme with no genes is always available.
    pub fn is_available(&self, knockouts: &HashSet<String>) -> bool {
        self.genes().all(|g| !knockouts.contains(g))
    }

    /// Whether two isozymes need exactly the same set of genes
    fn same_genes(&self, other: &Isozyme) -> bool {
        self.gene_product_stoichiometry.len() == other.gene_product_stoichiometry.len()
            && self
                .genes()
                .all(|g| other.gene_product_stoichiometry.contains_key(g))
    }
}

/// Whether a reaction with the given gene association can still be catalyzed after
/// the genes in `knockouts` are removed
///
/// Reactions without any gene association don't depend on genes and are always available,
/// otherwise at least one isozyme has to be available.
///
/// # Examples
/// ```rust
/// use std::collections::HashSet;
/// use metaflux_core::metabolic_model::gpr::{reaction_available, Isozyme};
/// let association = vec![Isozyme::new(["g1"]), Isozyme::new(["g2"])];
/// let knockouts: HashSet<String> = ["g1".to_string()].into_iter().collect();
/// assert!(reaction_available(Some(association.as_slice()), &knockouts));
/// assert!(reaction_available(None, &knockouts));
/// ```
pub fn reaction_available(association: Option<&[Isozyme]>, knockouts: &HashSet<String>) -> bool {
    match association {
        None => true,
        Some(isozymes) => isozymes.iter().any(|iso| iso.is_available(knockouts)),
    }
}

// region GPR Tree
/// Representation of a Gene Protein Reaction Rule as an AST
#[derive(Clone, Debug, PartialEq)]
pub enum Gpr {
    /// Operation on two genes (see [`GprOperation`])
    Operation(GprOperation),
    /// A terminal gene Node, holding the gene id
    GeneNode(String),
}

impl Display for Gpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_id())
    }
}

impl Gpr {
    /// Create a new binary operation node
    pub fn new_binary_operation(left: Gpr, operator: GprOperatorType, right: Gpr) -> Gpr {
        let op = match operator {
            GprOperatorType::Or => GprOperation::Or {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::And => GprOperation::And {
                left: Box::new(left),
                right: Box::new(right),
            },
        };
        Gpr::Operation(op)
    }

    /// Create a new gene node
    pub fn new_gene_node(gene: &str) -> Gpr {
        Gpr::GeneNode(gene.to_string())
    }

    /// Generate a GPR string with gene ids from the GPR AST
    pub fn to_string_id(&self) -> String {
        match self {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } => {
                    format!("({} or {})", left.to_string_id(), right.to_string_id())
                }
                GprOperation::And { left, right } => {
                    format!("({} and {})", left.to_string_id(), right.to_string_id())
                }
            },
            Gpr::GeneNode(gene_ref) => gene_ref.to_string(),
        }
    }

    /// Evaluate whether the rule still holds once the genes in `knockouts` are removed
    pub fn eval(&self, knockouts: &HashSet<String>) -> bool {
        match self {
            Gpr::Operation(GprOperation::Or { left, right }) => {
                left.eval(knockouts) || right.eval(knockouts)
            }
            Gpr::Operation(GprOperation::And { left, right }) => {
                left.eval(knockouts) && right.eval(knockouts)
            }
            Gpr::GeneNode(gene) => !knockouts.contains(gene),
        }
    }

    /// Ids of all genes in the rule, in order of first appearance
    pub fn genes(&self) -> Vec<String> {
        let mut genes = IndexSet::new();
        self.collect_genes(&mut genes);
        genes.into_iter().collect()
    }

    fn collect_genes(&self, genes: &mut IndexSet<String>) {
        match self {
            Gpr::Operation(GprOperation::Or { left, right })
            | Gpr::Operation(GprOperation::And { left, right }) => {
                left.collect_genes(genes);
                right.collect_genes(genes);
            }
            Gpr::GeneNode(gene) => {
                genes.insert(gene.clone());
            }
        }
    }

    /// Convert the rule into a list of isozymes (disjunctive normal form)
    ///
    /// Every gene gets a stoichiometry of 1 and no turnover numbers. Isozymes requiring
    /// exactly the same genes are only listed once.
    ///
    /// # Examples
    /// ```rust
    /// use indexmap::IndexMap;
    /// use metaflux_core::io::gpr_parse::parse_gpr;
    /// let mut genes = IndexMap::new();
    /// let gpr = parse_gpr("g1 and (g2 or g3)", &mut genes).unwrap();
    /// let isozymes = gpr.to_isozymes();
    /// assert_eq!(isozymes.len(), 2);
    /// assert_eq!(isozymes[0].genes().collect::<Vec<_>>(), vec!["g1", "g2"]);
    /// assert_eq!(isozymes[1].genes().collect::<Vec<_>>(), vec!["g1", "g3"]);
    /// ```
    pub fn to_isozymes(&self) -> Vec<Isozyme> {
        let mut isozymes: Vec<Isozyme> = Vec::new();
        for conjunction in self.conjunctions() {
            let isozyme = Isozyme::new(conjunction);
            if !isozymes.iter().any(|iso| iso.same_genes(&isozyme)) {
                isozymes.push(isozyme);
            }
        }
        isozymes
    }

    fn conjunctions(&self) -> Vec<IndexSet<String>> {
        match self {
            Gpr::GeneNode(gene) => vec![IndexSet::from([gene.clone()])],
            Gpr::Operation(GprOperation::Or { left, right }) => {
                let mut conjunctions = left.conjunctions();
                conjunctions.extend(right.conjunctions());
                conjunctions
            }
            Gpr::Operation(GprOperation::And { left, right }) => {
                let right_conjunctions = right.conjunctions();
                left.conjunctions()
                    .iter()
                    .flat_map(|l| {
                        right_conjunctions.iter().map(move |r| {
                            let mut merged = l.clone();
                            merged.extend(r.iter().cloned());
                            merged
                        })
                    })
                    .collect()
            }
        }
    }

    /// Build a rule from a list of isozymes
    ///
    /// Isozymes without genes can't be expressed as a rule and are skipped, None is returned
    /// if nothing is left.
    pub fn from_isozymes(isozymes: &[Isozyme]) -> Option<Gpr> {
        isozymes
            .iter()
            .filter_map(|iso| {
                iso.genes().map(Gpr::new_gene_node).reduce(|left, right| {
                    Gpr::new_binary_operation(left, GprOperatorType::And, right)
                })
            })
            .reduce(|left, right| Gpr::new_binary_operation(left, GprOperatorType::Or, right))
    }
}

/// Possible operations on genes
#[derive(Clone, Debug, PartialEq)]
pub enum GprOperation {
    Or { left: Box<Gpr>, right: Box<Gpr> },
    And { left: Box<Gpr>, right: Box<Gpr> },
}

/// Types of Allowed GPR Operations
pub enum GprOperatorType {
    /// Or, results in active if either left or right are active
    Or,
    /// And, results in active if both left and right are active
    And,
}
// endregion GPR Tree

#[cfg(test)]
mod tests {
    use super::*;

    fn knockouts(genes: &[&str]) -> HashSet<String> {
        genes.iter().map(|g| g.to_string()).collect()
    }

    #[test]
    fn single_and_isozyme() {
        let association = vec![Isozyme::new(["g1", "g2"])];
        assert!(!reaction_available(Some(association.as_slice()), &knockouts(&["g1"])));
        assert!(!reaction_available(Some(association.as_slice()), &knockouts(&["g2"])));
        assert!(reaction_available(Some(association.as_slice()), &knockouts(&[])));
        assert!(reaction_available(Some(association.as_slice()), &knockouts(&["g3"])));
    }

    #[test]
    fn or_of_isozymes() {
        let association = vec![Isozyme::new(["g1"]), Isozyme::new(["g2"])];
        assert!(reaction_available(Some(association.as_slice()), &knockouts(&["g1"])));
        assert!(reaction_available(Some(association.as_slice()), &knockouts(&["g2"])));
        assert!(!reaction_available(
            Some(association.as_slice()),
            &knockouts(&["g1", "g2"])
        ));
    }

    #[test]
    fn empty_cases() {
        // An isozyme without genes can't be knocked out
        let empty_isozyme = vec![Isozyme::default()];
        assert!(reaction_available(Some(empty_isozyme.as_slice()), &knockouts(&["g1"])));
        // No isozymes at all means nothing can catalyze the reaction
        assert!(!reaction_available(Some(&[][..]), &knockouts(&[])));
        // No association means no dependence on genes
        assert!(reaction_available(None, &knockouts(&["g1", "g2"])));
    }

    #[test]
    fn eval_matches_isozymes() {
        let gpr = Gpr::new_binary_operation(
            Gpr::new_binary_operation(
                Gpr::new_gene_node("g1"),
                GprOperatorType::And,
                Gpr::new_gene_node("g2"),
            ),
            GprOperatorType::Or,
            Gpr::new_gene_node("g3"),
        );
        let isozymes = gpr.to_isozymes();
        for ko in [
            vec![],
            vec!["g1"],
            vec!["g3"],
            vec!["g1", "g3"],
            vec!["g2", "g3"],
            vec!["g1", "g2"],
        ] {
            let ko = knockouts(&ko);
            assert_eq!(gpr.eval(&ko), reaction_available(Some(isozymes.as_slice()), &ko));
        }
        assert!(!gpr.eval(&knockouts(&["g2", "g3"])));
        assert!(gpr.eval(&knockouts(&["g1", "g2"])));
    }

    #[test]
    fn dnf_deduplicates() {
        // (g1 or g1) and g2 => [{g1, g2}]
        let gpr = Gpr::new_binary_operation(
            Gpr::new_binary_operation(
                Gpr::new_gene_node("g1"),
                GprOperatorType::Or,
                Gpr::new_gene_node("g1"),
            ),
            GprOperatorType::And,
            Gpr::new_gene_node("g2"),
        );
        let isozymes = gpr.to_isozymes();
        assert_eq!(isozymes.len(), 1);
        assert_eq!(isozymes[0].genes().collect::<Vec<_>>(), vec!["g1", "g2"]);
        assert_eq!(gpr.genes(), vec!["g1".to_string(), "g2".to_string()]);
    }

    #[test]
    fn from_isozymes_display() {
        let isozymes = vec![Isozyme::new(["g1", "g2"]), Isozyme::new(["g3"])];
        let gpr = Gpr::from_isozymes(&isozymes).unwrap();
        assert_eq!(format!("{}", gpr), "((g1 and g2) or g3)");
        assert!(Gpr::from_isozymes(&[]).is_none());
    }
}
