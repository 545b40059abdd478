use std::cmp;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Returns uppercase SQL keyword for ORDER BY clauses.
    pub const fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

pub trait SortKey: Copy + Eq {
    fn default() -> Self;
    fn from_query(value: &str) -> Option<Self>;
    fn query_value(self) -> &'static str;
    fn default_direction(self) -> SortDirection;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PageSize {
    Limited(u32),
    All,
}

impl PageSize {
    pub fn limited(size: u32) -> Self {
        if size == 0 {
            PageSize::All
        } else {
            PageSize::Limited(size)
        }
    }

    pub const fn as_option(self) -> Option<u32> {
        match self {
            PageSize::Limited(value) => Some(value),
            PageSize::All => None,
        }
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ListRequest<K: SortKey> {
    page: u32,
    page_size: PageSize,
    sort_key: K,
    sort_direction: SortDirection,
}

impl<K: SortKey> ListRequest<K> {
    pub fn new(page: u32, page_size: PageSize, sort_key: K, sort_direction: SortDirection) -> Self {
        let page = page.max(1);
        let page_size = match page_size {
            PageSize::Limited(size) => {
                if size == 0 {
                    PageSize::All
                } else {
                    PageSize::Limited(cmp::min(size, MAX_PAGE_SIZE).max(1))
                }
            }
            PageSize::All => PageSize::All,
        };

        Self {
            page,
            page_size,
            sort_key,
            sort_direction,
        }
    }

    pub fn default_query() -> Self {
        let key = K::default();
        Self::new(
            1,
            PageSize::Limited(DEFAULT_PAGE_SIZE),
            key,
            key.default_direction(),
        )
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub const fn sort_key(&self) -> K {
        self.sort_key
    }

    pub const fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub showing_all: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total: u64, showing_all: bool) -> Self {
        Self {
            items,
            page: page.max(1),
            page_size: page_size.max(1),
            total,
            showing_all,
        }
    }

    pub fn total_pages(&self) -> u32 {
        if self.total == 0 || self.showing_all {
            1
        } else {
            let size = u64::from(self.page_size);
            (self.total.div_ceil(size)) as u32
        }
    }
}
