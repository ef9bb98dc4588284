use super::entry::EntryKind;

/// Catalog entry offered to users when labelling a ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: u32,
    pub name: &'static str,
    pub kind: EntryKind,
}

static CATALOG: [Category; 12] = [
    Category { id: 1, name: "Alimentação", kind: EntryKind::Expense },
    Category { id: 2, name: "Transporte", kind: EntryKind::Expense },
    Category { id: 3, name: "Moradia", kind: EntryKind::Expense },
    Category { id: 4, name: "Saúde", kind: EntryKind::Expense },
    Category { id: 5, name: "Educação", kind: EntryKind::Expense },
    Category { id: 6, name: "Lazer", kind: EntryKind::Expense },
    Category { id: 7, name: "Débitos CNPJ", kind: EntryKind::Expense },
    Category { id: 8, name: "Outros Gastos", kind: EntryKind::Expense },
    Category { id: 9, name: "Salário", kind: EntryKind::Income },
    Category { id: 10, name: "Freelance", kind: EntryKind::Income },
    Category { id: 11, name: "Investimentos", kind: EntryKind::Income },
    Category { id: 12, name: "Outras Receitas", kind: EntryKind::Income },
];

pub fn catalog() -> &'static [Category] {
    &CATALOG
}

/// Categories offered for the given kind, in catalog order.
pub fn categories_for(kind: EntryKind) -> impl Iterator<Item = &'static Category> {
    CATALOG.iter().filter(move |category| category.kind == kind)
}
