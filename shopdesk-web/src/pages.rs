//! Admin page table

/// A page of the admin section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminPage {
    pub path: &'static str,
    pub title: &'static str,
    /// Permission required to open the page; `None` needs only a session
    pub page_id: Option<&'static str>,
}

pub const DASHBOARD: AdminPage = AdminPage {
    path: "/",
    title: "Dashboard",
    page_id: None,
};

pub const ADMIN_PAGES: &[AdminPage] = &[
    DASHBOARD,
    // Catalog
    AdminPage {
        path: "/catalog/products",
        title: "Products",
        page_id: Some("products.view"),
    },
    AdminPage {
        path: "/catalog/categories",
        title: "Categories",
        page_id: Some("categories.view"),
    },
    AdminPage {
        path: "/catalog/brands",
        title: "Brands",
        page_id: Some("brands.view"),
    },
    AdminPage {
        path: "/catalog/flavours",
        title: "Flavours",
        page_id: Some("flavours.view"),
    },
    AdminPage {
        path: "/catalog/skus",
        title: "SKUs",
        page_id: Some("skus.view"),
    },
    AdminPage {
        path: "/catalog/delivery-times",
        title: "Delivery times",
        page_id: Some("delivery-times.view"),
    },
    AdminPage {
        path: "/orders",
        title: "Orders",
        page_id: Some("orders.view"),
    },
    // Business admin
    AdminPage {
        path: "/business-admin/positions",
        title: "Positions",
        page_id: Some("positions.view"),
    },
    AdminPage {
        path: "/business-admin/permissions",
        title: "Permissions",
        page_id: Some("permissions.view"),
    },
    AdminPage {
        path: "/business-admin/login-requests",
        title: "Login requests",
        page_id: Some("login-requests.view"),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_paths_and_ids_are_unique() {
        let paths: HashSet<_> = ADMIN_PAGES.iter().map(|p| p.path).collect();
        assert_eq!(paths.len(), ADMIN_PAGES.len());

        let ids: Vec<_> = ADMIN_PAGES.iter().filter_map(|p| p.page_id).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_only_dashboard_is_ungated() {
        let ungated: Vec<_> = ADMIN_PAGES.iter().filter(|p| p.page_id.is_none()).collect();
        assert_eq!(ungated, vec![&DASHBOARD]);
    }
}
